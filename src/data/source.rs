use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use reqwest::blocking::Client;

use super::{
    FALLBACK_ITEMS, FALLBACK_RATINGS,
    error::{DataErr, Result},
};

pub const DEFAULT_ITEMS_URL: &str = "https://raw.githubusercontent.com/tensorflow/tfjs-examples/master/multivariate-linear-regression/data/uci-iris-mlens-u.item";
pub const DEFAULT_RATINGS_URL: &str = "https://raw.githubusercontent.com/tensorflow/tfjs-examples/master/multivariate-linear-regression/data/uci-iris-mlens-u.data";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Somewhere the two raw dataset tables can be read from.
pub trait DataSource {
    /// Returns the raw, pipe-delimited item table.
    fn items(&self) -> Result<String>;

    /// Returns the raw, tab-delimited rating table.
    fn ratings(&self) -> Result<String>;

    /// A short name for logging.
    fn name(&self) -> &str;
}

/// Fetches both tables over HTTP.
pub struct HttpSource {
    client: Client,
    items_url: String,
    ratings_url: String,
}

impl HttpSource {
    /// Creates a new `HttpSource`.
    ///
    /// # Arguments
    /// * `items_url` - Where to GET the item table from.
    /// * `ratings_url` - Where to GET the rating table from.
    ///
    /// # Returns
    /// A new `HttpSource` or an error if the http client couldn't be built.
    pub fn new(items_url: impl Into<String>, ratings_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            client,
            items_url: items_url.into(),
            ratings_url: ratings_url.into(),
        })
    }

    /// Creates a new `HttpSource` pointing at the MovieLens 100K mirror.
    pub fn movielens() -> Result<Self> {
        Self::new(DEFAULT_ITEMS_URL, DEFAULT_RATINGS_URL)
    }

    fn get(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send()?;
        let status = response.status();

        if !status.is_success() {
            return Err(DataErr::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.text()?)
    }
}

impl DataSource for HttpSource {
    fn items(&self) -> Result<String> {
        self.get(&self.items_url)
    }

    fn ratings(&self) -> Result<String> {
        self.get(&self.ratings_url)
    }

    fn name(&self) -> &str {
        "http"
    }
}

/// Reads both tables from the local filesystem.
#[derive(Debug, Clone)]
pub struct FileSource {
    items_path: PathBuf,
    ratings_path: PathBuf,
}

impl FileSource {
    pub fn new(items_path: impl Into<PathBuf>, ratings_path: impl Into<PathBuf>) -> Self {
        Self {
            items_path: items_path.into(),
            ratings_path: ratings_path.into(),
        }
    }

    /// Uses the MovieLens file names, `u.item` and `u.data`, inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self::new(dir.join("u.item"), dir.join("u.data"))
    }
}

impl DataSource for FileSource {
    fn items(&self) -> Result<String> {
        Ok(fs::read_to_string(&self.items_path)?)
    }

    fn ratings(&self) -> Result<String> {
        Ok(fs::read_to_string(&self.ratings_path)?)
    }

    fn name(&self) -> &str {
        "file"
    }
}

/// Serves the embedded sample tables rendered in their wire formats.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmbeddedSource;

impl DataSource for EmbeddedSource {
    fn items(&self) -> Result<String> {
        Ok(FALLBACK_ITEMS
            .iter()
            .map(|(id, title)| format!("{id}|{title}\n"))
            .collect())
    }

    fn ratings(&self) -> Result<String> {
        Ok(FALLBACK_RATINGS
            .iter()
            .map(|(user_id, item_id, rating)| format!("{user_id}\t{item_id}\t{rating}\n"))
            .collect())
    }

    fn name(&self) -> &str {
        "embedded"
    }
}

#[cfg(test)]
mod tests {
    use std::{
        io::{BufRead, BufReader, Write},
        net::TcpListener,
        thread::{self, JoinHandle},
    };

    use super::*;
    use crate::data::{
        Dataset, DatasetLoader, fallback_items, fallback_ratings, parse_items, parse_ratings,
    };

    /// Answers `requests` requests on a local port with an empty 404 and returns its base url.
    fn not_found_server(requests: usize) -> (String, JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());

        let handle = thread::spawn(move || {
            for stream in listener.incoming().take(requests) {
                let mut stream = stream.unwrap();
                let mut reader = BufReader::new(stream.try_clone().unwrap());

                let mut line = String::new();
                while reader.read_line(&mut line).unwrap() > 0 && line != "\r\n" {
                    line.clear();
                }

                stream
                    .write_all(
                        b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                    )
                    .unwrap();
            }
        });

        (base, handle)
    }

    #[test]
    fn unsuccessful_status_is_an_error() {
        let (base, server) = not_found_server(1);
        let url = format!("{base}/u.item");
        let source = HttpSource::new(url.clone(), format!("{base}/u.data")).unwrap();

        let result = source.items();
        server.join().unwrap();

        match result {
            Err(DataErr::Status { url: got, status }) => {
                assert_eq!(got, url);
                assert_eq!(status, 404);
            }
            other => panic!("expected a 404 status error, got {other:?}"),
        }
    }

    #[test]
    fn not_found_tables_load_as_the_fallback() {
        let (base, server) = not_found_server(2);
        let source = HttpSource::new(format!("{base}/u.item"), format!("{base}/u.data")).unwrap();

        let dataset = DatasetLoader::new(source).load();
        server.join().unwrap();

        assert_eq!(dataset, Dataset::fallback());
    }

    #[test]
    fn embedded_tables_parse_back_to_the_fallback() {
        let source = EmbeddedSource;

        assert_eq!(parse_items(&source.items().unwrap()), fallback_items());
        assert_eq!(parse_ratings(&source.ratings().unwrap()), fallback_ratings());
    }

    #[test]
    fn missing_files_are_io_errors() {
        let source = FileSource::in_dir("/definitely/not/a/dataset/dir");

        assert!(matches!(source.items(), Err(DataErr::Io(_))));
        assert!(matches!(source.ratings(), Err(DataErr::Io(_))));
    }
}

use super::{Item, Rating};

const ITEM_DELIMITER: char = '|';
const RATING_DELIMITER: char = '\t';

/// Parses a pipe-delimited item table (`id|title|...`).
///
/// Rows whose id isn't an integer or whose title is empty are skipped.
pub fn parse_items(text: &str) -> Vec<Item> {
    non_blank_lines(text)
        .filter_map(|line| {
            let mut fields = line.split(ITEM_DELIMITER);
            let id = fields.next()?.trim().parse().ok()?;
            let title = fields.next()?;

            if title.is_empty() {
                return None;
            }

            Some(Item::new(id, title))
        })
        .collect()
}

/// Parses a tab-delimited rating table (`user\titem\trating[\t...]`).
///
/// Rows with less than three fields or with any unparsable field are skipped, trailing
/// fields such as timestamps are ignored.
pub fn parse_ratings(text: &str) -> Vec<Rating> {
    non_blank_lines(text)
        .filter_map(|line| {
            let mut fields = line.split(RATING_DELIMITER).map(str::trim);
            let user_id = fields.next()?.parse().ok()?;
            let item_id = fields.next()?.parse().ok()?;
            let rating: f32 = fields.next()?.parse().ok()?;

            rating
                .is_finite()
                .then(|| Rating::new(user_id, item_id, rating))
        })
        .collect()
}

fn non_blank_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines().filter(|line| !line.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_line_keeps_id_and_title() {
        let items = parse_items("1|Toy Story (1995)|01-Jan-1995||http://us.imdb.com|0|0|1\n");
        assert_eq!(items, vec![Item::new(1, "Toy Story (1995)")]);
    }

    #[test]
    fn malformed_item_lines_are_skipped() {
        let text = "abc|Foo\n\n2|GoldenEye (1995)\n3\n4|\n   \n5|Copycat (1995)";
        let items = parse_items(text);

        assert_eq!(
            items,
            vec![
                Item::new(2, "GoldenEye (1995)"),
                Item::new(5, "Copycat (1995)")
            ]
        );
    }

    #[test]
    fn rating_line_ignores_the_timestamp() {
        let ratings = parse_ratings("1\t2\t5\t881250949\n");
        assert_eq!(ratings, vec![Rating::new(1, 2, 5.0)]);
    }

    #[test]
    fn malformed_rating_lines_are_skipped() {
        let text = "1\t2\tfive\t0\n1\t2\n\nx\t1\t3\n196\t242\t3\t881250949\n7\t8\tNaN";
        let ratings = parse_ratings(text);

        assert_eq!(ratings, vec![Rating::new(196, 242, 3.0)]);
    }

    #[test]
    fn crlf_line_endings_are_accepted() {
        let ratings = parse_ratings("1\t1\t4\r\n2\t3\t2.5\r\n");
        assert_eq!(
            ratings,
            vec![Rating::new(1, 1, 4.0), Rating::new(2, 3, 2.5)]
        );
    }
}

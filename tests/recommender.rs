use std::{
    cell::RefCell,
    panic::{self, AssertUnwindSafe},
    rc::Rc,
    sync::mpsc,
    thread,
};

use rand::{Rng, SeedableRng, rngs::StdRng};

use rating_recommender::{
    Dataset, DatasetLoader, EpochStats, MatrixFactorization, ModelShape, Rating, RecErr,
    Recommender, TrainingConfig, build_and_train,
    data::{EmbeddedSource, parse_items, parse_ratings},
    training::OptimizerConfig,
};

fn quiet(_: &EpochStats) {}

fn seeded(seed: u64) -> TrainingConfig {
    TrainingConfig {
        seed: Some(seed),
        ..Default::default()
    }
}

/// 3 users and 3 items where every user loves the item sharing its id.
fn synthetic() -> Dataset {
    let ratings = (0..20)
        .map(|n| {
            let user_id = n % 3 + 1;
            let item_id = (n / 3) % 3 + 1;
            let rating = if user_id == item_id { 5. } else { 2. };
            Rating::new(user_id, item_id, rating)
        })
        .collect();

    Dataset::from_records(Vec::new(), ratings).unwrap()
}

#[test]
fn fallback_dataset_cardinalities() {
    let dataset = DatasetLoader::new(EmbeddedSource).load();

    assert_eq!(dataset.items().len(), 5);
    assert_eq!(dataset.ratings().len(), 5);
    assert_eq!(dataset.num_users(), 4);
    assert_eq!(dataset.num_items(), 4);
    assert_eq!(dataset.user_ids().collect::<Vec<_>>(), [1, 2, 3]);
    assert_eq!(dataset, Dataset::fallback());
}

#[test]
fn parsing_examples() {
    let items = parse_items("1|Toy Story (1995)|01-Jan-1995\nabc|Foo\n");
    assert_eq!(items.len(), 1);
    assert_eq!((items[0].id, items[0].title.as_str()), (1, "Toy Story (1995)"));

    let ratings = parse_ratings("1\t2\t5\t881250949\n1\t3\tfive\t881250949\n");
    assert_eq!(ratings, [Rating::new(1, 2, 5.)]);
}

#[test]
fn untrained_model_predicts_three() {
    let rng = Rc::new(RefCell::new(StdRng::seed_from_u64(1)));
    let shape = ModelShape::new(50, 80, 8);
    let model = MatrixFactorization::build(shape, &Default::default(), rng).unwrap();

    for (user_id, item_id) in [(0, 0), (1, 79), (49, 1), (25, 40)] {
        let rating = model.predict(user_id, item_id).unwrap();
        assert!((rating - 3.).abs() < 0.05, "{rating}");
    }
}

#[test]
fn seeded_runs_are_reproducible() {
    let dataset = synthetic();
    let config = TrainingConfig {
        epochs: 5,
        ..seeded(1234)
    };

    let a = build_and_train(&dataset, &config, &mut quiet).unwrap();
    let b = build_and_train(&dataset, &config, &mut quiet).unwrap();

    assert_eq!(a.report, b.report);
    for user_id in 1..4 {
        for item_id in 1..4 {
            assert_eq!(
                a.predict(user_id, item_id).unwrap(),
                b.predict(user_id, item_id).unwrap()
            );
        }
    }
}

#[test]
fn loss_decreases_on_a_learnable_dataset() {
    let config = TrainingConfig {
        epochs: 20,
        batch_size: 4,
        learning_rate: 0.05,
        ..seeded(7)
    };

    let mut losses = Vec::new();
    let trained = build_and_train(&synthetic(), &config, &mut |stats: &EpochStats| {
        losses.push(stats.loss)
    })
    .unwrap();

    assert_eq!(losses.len(), 20);
    assert_eq!(trained.report.losses, losses);
    assert!(losses[19] < losses[0], "{losses:?}");
    assert!(trained.report.final_val_loss().is_some());

    let liked = trained.predict(1, 1).unwrap();
    let disliked = trained.predict(1, 2).unwrap();
    assert!(liked > disliked, "{liked} <= {disliked}");
}

#[test]
fn one_past_the_last_user_is_out_of_range() {
    let recommender = Recommender::new(Dataset::fallback(), seeded(3)).unwrap();
    recommender.train(&mut quiet).unwrap();

    let num_users = recommender.dataset().num_users();
    assert!(matches!(
        recommender.predict(num_users, 1),
        Err(RecErr::IndexOutOfRange {
            what: "user",
            index,
            len,
        }) if index == num_users && len == num_users
    ));
    assert!(recommender.predict(num_users - 1, 1).is_ok());
}

#[test]
fn predictions_stay_in_range_for_any_parameters() {
    let mut rng = StdRng::seed_from_u64(99);
    let shape = ModelShape::new(4, 5, 3);

    for _ in 0..50 {
        let params = (0..shape.num_params().unwrap())
            .map(|_| rng.random_range(-50.0..50.0))
            .collect();
        let model = MatrixFactorization::from_params(shape, params).unwrap();

        for user_id in 0..4 {
            for item_id in 0..5 {
                let rating = model.predict(user_id, item_id).unwrap();
                assert!((0. ..=5.).contains(&rating), "{rating}");
            }
        }
    }
}

#[test]
fn diverging_run_never_serves_nan() {
    let config = TrainingConfig {
        epochs: 1,
        learning_rate: 1e30,
        optimizer: OptimizerConfig::GradientDescent,
        ..seeded(11)
    };

    let trained = match build_and_train(&synthetic(), &config, &mut quiet) {
        Err(e) => {
            assert!(matches!(e, RecErr::TrainingFailure { .. }), "{e}");
            return;
        }
        Ok(trained) => trained,
    };

    for user_id in 0..4 {
        for item_id in 0..4 {
            match trained.predict(user_id, item_id) {
                Ok(rating) => assert!((0. ..=5.).contains(&rating), "{rating}"),
                Err(e) => assert!(matches!(e, RecErr::NonFiniteScore { .. }), "{e}"),
            }
        }
    }
}

#[test]
fn concurrent_training_is_rejected() {
    let recommender = Recommender::new(synthetic(), seeded(5)).unwrap();
    let (started_tx, started_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel::<()>();

    thread::scope(|s| {
        let first = s.spawn(|| {
            recommender.train(&mut move |stats: &EpochStats| {
                if stats.epoch == 0 {
                    started_tx.send(()).unwrap();
                    release_rx.recv().unwrap();
                }
            })
        });

        started_rx.recv().unwrap();
        assert!(recommender.is_training());
        assert!(matches!(
            recommender.train(&mut quiet),
            Err(RecErr::TrainingAlreadyInProgress)
        ));

        release_tx.send(()).unwrap();
        assert!(first.join().unwrap().is_ok());
    });

    assert!(!recommender.is_training());
    assert!(recommender.train(&mut quiet).is_ok());
}

#[test]
fn failed_run_releases_the_guard() {
    let recommender = Recommender::new(Dataset::fallback(), seeded(8)).unwrap();

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        recommender.train(&mut |stats: &EpochStats| {
            if stats.epoch == 0 {
                panic!("observer failed")
            }
        })
    }));

    assert!(result.is_err());
    assert!(!recommender.is_training());
    assert!(matches!(
        recommender.predict(1, 1),
        Err(RecErr::ModelNotReady)
    ));

    recommender.train(&mut quiet).unwrap();
    assert!(recommender.predict(1, 1).is_ok());
}

#[test]
fn empty_training_portion_is_reported() {
    let dataset = Dataset::from_records(Vec::new(), vec![Rating::new(1, 1, 4.)]).unwrap();
    let config = TrainingConfig {
        validation_split: 0.5,
        ..seeded(1)
    };

    let recommender = Recommender::new(dataset, config).unwrap();
    assert!(matches!(
        recommender.train(&mut quiet),
        Err(RecErr::EmptyTrainingSet { total: 1, .. })
    ));
    assert!(!recommender.is_training());
}

use csv::ReaderBuilder;
use nalgebra::{DMatrix, DVector};
use rusty_trees::boosting::regressor::GradientBoostedRegressor;
use rusty_trees::data::dataset::Dataset;
use rusty_trees::forests::classifier::RandomForestClassifier;
use rusty_trees::metrics::confusion::ClassificationMetrics;
use rusty_trees::metrics::errors::RegressionMetrics;
use rusty_trees::trees::classifier::DecisionTreeClassifier;
use std::collections::HashMap;
use std::error::Error;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: evaluate <classify|regress> <csv-path> [train-fraction]";
const SPLIT_SEED: u64 = 42;

/// Header row plus parsed records. The last column is the target.
fn read_records(file_path: &str) -> Result<(Vec<String>, Vec<csv::StringRecord>), Box<dyn Error>> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_path(file_path)?;
    let headers = reader.headers()?.iter().map(str::to_string).collect::<Vec<_>>();
    if headers.len() < 2 {
        return Err("Expected at least one feature column and a label column".into());
    }
    let records = reader.records().collect::<Result<Vec<_>, _>>()?;
    if records.is_empty() {
        return Err("The file has no data rows".into());
    }
    Ok((headers, records))
}

fn feature_matrix(
    records: &[csv::StringRecord],
    dimension: usize,
) -> Result<DMatrix<f64>, Box<dyn Error>> {
    let mut features = Vec::with_capacity(records.len() * dimension);
    for record in records {
        for feature in record.iter().take(dimension) {
            features.push(feature.trim().parse::<f64>()?);
        }
    }
    Ok(DMatrix::from_row_slice(records.len(), dimension, &features))
}

fn read_file_classification(file_path: &str) -> Result<Dataset<f64, u32>, Box<dyn Error>> {
    let (headers, records) = read_records(file_path)?;
    let dimension = headers.len() - 1;

    let mut label_map = HashMap::new();
    let mut labels = Vec::with_capacity(records.len());
    for record in &records {
        let label = record.get(dimension).ok_or("Missing label")?;
        let next_id = label_map.len() as u32;
        labels.push(*label_map.entry(label.to_string()).or_insert(next_id));
    }

    let dataset = Dataset::new(
        feature_matrix(&records, dimension)?,
        DVector::from_vec(labels),
    );
    Ok(dataset.with_feature_names(headers[..dimension].to_vec())?)
}

fn read_file_regression(file_path: &str) -> Result<Dataset<f64, f64>, Box<dyn Error>> {
    let (headers, records) = read_records(file_path)?;
    let dimension = headers.len() - 1;

    let labels = records
        .iter()
        .map(|record| -> Result<f64, Box<dyn Error>> {
            Ok(record.get(dimension).ok_or("Missing label")?.trim().parse::<f64>()?)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let dataset = Dataset::new(
        feature_matrix(&records, dimension)?,
        DVector::from_vec(labels),
    );
    Ok(dataset.with_feature_names(headers[..dimension].to_vec())?)
}

fn evaluate_classifiers(
    train_dataset: &Dataset<f64, u32>,
    test_dataset: &Dataset<f64, u32>,
) -> Result<(), Box<dyn Error>> {
    let mut tree = DecisionTreeClassifier::with_params(None, None, None)?;
    tree.set_seed(Some(SPLIT_SEED));
    tree.fit(train_dataset)?;
    let predictions = tree.predict(&test_dataset.x)?;
    let accuracy = tree.accuracy(&test_dataset.y, &predictions)?;
    let depth = tree.root().map(|root| root.depth());
    tracing::info!(accuracy, depth, "decision tree");

    let mut forest = RandomForestClassifier::new();
    forest.set_seed(Some(SPLIT_SEED));
    forest.fit(train_dataset)?;
    let predictions = forest.predict(&test_dataset.x)?;
    let accuracy = forest.accuracy(&test_dataset.y, &predictions)?;
    tracing::info!(accuracy, trees = forest.trees().len(), "random forest");
    Ok(())
}

fn evaluate_regressor(
    train_dataset: &Dataset<f64, f64>,
    test_dataset: &Dataset<f64, f64>,
) -> Result<(), Box<dyn Error>> {
    let mut regressor = GradientBoostedRegressor::new();
    regressor.fit(train_dataset)?;

    let predictions = regressor.predict(&test_dataset.x)?;
    let mse = regressor.mse(&test_dataset.y, &predictions)?;
    let r2 = regressor.r2(&test_dataset.y, &predictions)?;
    tracing::info!(mse, r2, "gradient boosted trees");

    let mut importances = regressor.named_feature_importances().unwrap_or_default();
    importances.sort_by(|a, b| b.1.total_cmp(&a.1));
    for (name, importance) in importances {
        tracing::info!(feature = %name, importance, "feature importance");
    }
    Ok(())
}

fn run(args: &[String]) -> Result<(), Box<dyn Error>> {
    let (task, path) = match args {
        [task, path, ..] => (task.as_str(), path.as_str()),
        _ => return Err(USAGE.into()),
    };
    let train_size = match args.get(2) {
        Some(fraction) => fraction.parse::<f64>()?,
        None => 0.75,
    };

    match task {
        "classify" => {
            let dataset = read_file_classification(path)?;
            tracing::info!(rows = dataset.nrows(), features = dataset.ncols(), "loaded dataset");
            let (train_dataset, test_dataset) =
                dataset.train_test_split(train_size, Some(SPLIT_SEED))?;
            evaluate_classifiers(&train_dataset, &test_dataset)
        }
        "regress" => {
            let dataset = read_file_regression(path)?;
            tracing::info!(rows = dataset.nrows(), features = dataset.ncols(), "loaded dataset");
            let (train_dataset, test_dataset) =
                dataset.train_test_split(train_size, Some(SPLIT_SEED))?;
            evaluate_regressor(&train_dataset, &test_dataset)
        }
        _ => Err(USAGE.into()),
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{}", err);
            ExitCode::FAILURE
        }
    }
}

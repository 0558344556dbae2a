use data_loader::Dataset;
use std::path::PathBuf;
use std::time::Instant;

fn main() {
    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data/movies.csv"));

    println!("Loading training data from {}...\n", path.display());

    let start = Instant::now();
    let dataset = Dataset::load_training(&path).expect("Failed to load dataset");
    let elapsed = start.elapsed();

    println!("\n=== Load Complete ===");
    println!("Time taken: {:?}", elapsed);
    println!("Trainable rows: {}", dataset.len());
    for (genre, count) in dataset.genre_counts() {
        println!("  {}: {}", genre, count);
    }
    println!("\nPerformance: {:.0} rows/second",
             dataset.len() as f64 / elapsed.as_secs_f64());
}

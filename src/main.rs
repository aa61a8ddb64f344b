fn main() {
    if let Err(err) = kinship::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

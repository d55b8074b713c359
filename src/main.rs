fn main() {
    if let Err(err) = stepflow_layout::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

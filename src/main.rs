fn main() {
    if let Err(err) = precifica::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

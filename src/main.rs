fn main() {
    if let Err(err) = wheelcard::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn main() {
    if let Err(err) = tabstep::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

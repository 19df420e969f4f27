fn main() {
    if let Err(err) = jotterxpress::entry() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

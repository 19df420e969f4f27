//! Short binary name (`jtx`) that forwards to the `jotterxpress` library.
//! Keeping the alias as a real binary avoids shell alias requirements.

fn main() {
    if let Err(err) = jotterxpress::entry() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

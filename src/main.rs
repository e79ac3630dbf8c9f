fn main() {
    if let Err(err) = chemviz_lib::run() {
        eprintln!("chemviz: {err}");
        std::process::exit(1);
    }
}

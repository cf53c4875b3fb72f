mod allocator;

use std::process;

use ec_ftp_core::cli::App;

fn main() {
    if let Err(e) = App::init().and_then(App::execute) {
        eprintln!("Error: {e:?}");
        process::exit(1);
    }
}

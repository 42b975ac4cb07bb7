#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

fn main() {
    let result = if std::env::args_os().count() <= 1 {
        slide_explorer::ui::run(None)
    } else {
        slide_explorer::run_cli()
    };

    if let Err(error) = result {
        eprintln!("{error}");
        std::process::exit(1);
    }
}

#![warn(clippy::all)]
#![warn(rust_2018_idioms)]

use std::{env, process};

use lispy_interpreter::{
    diagnostics_for_error, emit_diagnostics_to_stderr, Config, EvalCtx, FileSysLoader,
};

fn main() {
    use clap::{crate_version, App, Arg};

    env_logger::builder().format_timestamp(None).init();

    let matches = App::new("lispy")
        .version(crate_version!())
        .about("Interpreter for the Lispy language")
        .arg(
            Arg::with_name("UNIT")
                .help("Name of the unit to run from the current directory")
                .required(true)
                .index(1),
        )
        .get_matches();

    let unit_name = matches.value_of("UNIT").unwrap();

    let current_dir = match env::current_dir() {
        Ok(current_dir) => current_dir,
        Err(err) => {
            eprintln!("cannot determine current directory: {}", err);
            process::exit(1);
        }
    };

    let loader = FileSysLoader::new(vec![current_dir]);
    let mut ecx = EvalCtx::new(loader, Config::default());

    if let Err(err) = ecx.run_module(unit_name) {
        log::debug!("`{}` failed: {:?}", unit_name, err);

        let diagnostics = diagnostics_for_error(ecx.source_loader(), &err);
        emit_diagnostics_to_stderr(ecx.source_loader(), diagnostics);

        process::exit(2);
    }
}

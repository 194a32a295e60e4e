use std::{env, fs, path::PathBuf};

use clap::{Arg, Command, arg, value_parser};

fn input_arg() -> Arg {
    arg!(<INPUT> "URL to fetch, local HTML file, or '-' for stdin")
}

fn output_arg() -> Arg {
    arg!(-o --output <FILE> "Output file (default: stdout)")
        .value_name("FILE")
        .value_parser(value_parser!(PathBuf))
}

fn timeout_arg() -> Arg {
    arg!(--timeout <SECS> "HTTP timeout in seconds").default_value("10")
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=OUT_DIR");

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let completions_dir = out_dir.join("completions");

    fs::create_dir_all(&completions_dir).unwrap();

    let mut cmd = Command::new("synopsis")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Synopsis Contributors")
        .about("Summarize web pages with a language model")
        .arg(arg!(-v --verbose "Enable debug logging and step output").global(true))
        .subcommand(
            Command::new("summarize")
                .about("Fetch a page, extract its main text and summarize it")
                .arg(input_arg())
                .arg(
                    arg!(-m --model <MODEL> "Model to use (default: AI_MODEL or gpt-4o)")
                        .value_parser(["gpt-4o", "gpt-3.5-turbo"]),
                )
                .arg(arg!(--"max-length" <CHARS> "Maximum number of characters sent to the model"))
                .arg(timeout_arg())
                .arg(output_arg()),
        )
        .subcommand(
            Command::new("extract")
                .about("Fetch a page and print its main text without summarizing")
                .arg(input_arg())
                .arg(timeout_arg())
                .arg(output_arg()),
        )
        .subcommand(Command::new("models").about("List the supported models"));

    clap_complete::generate_to(clap_complete::shells::Bash, &mut cmd, "synopsis", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Zsh, &mut cmd, "synopsis", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Fish, &mut cmd, "synopsis", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::PowerShell, &mut cmd, "synopsis", &completions_dir).unwrap();

    println!(
        "cargo:warning=Shell completions generated in: {}",
        completions_dir.display()
    );
}

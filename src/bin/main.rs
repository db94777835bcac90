use std::{env, error::Error, fs, process};

use triglot::{translate, Lang};

fn main() {
    if let Err(error) = run() {
        eprintln!("{error}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = env::args().collect();
    let [_, path, from, to] = args.as_slice() else {
        return Err("usage: triglot <file> <from-lang> <to-lang>".into());
    };

    let from = Lang::from_name(from).ok_or_else(|| format!("unknown language `{from}`"))?;
    let to = Lang::from_name(to).ok_or_else(|| format!("unknown language `{to}`"))?;

    let source = fs::read_to_string(path)?;
    let output = translate(&source, from, to)?;
    print!("{output}");
    Ok(())
}

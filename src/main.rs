use clap::{value_t, App, Arg};
use dicehmm::format::{agreement, render_path, render_rolls, write_report};
use dicehmm::Model;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;
#[macro_use]
extern crate log;

fn app() -> App<'static, 'static> {
    App::new("dicehmm")
        .version("0.1")
        .author("Bansho Masutani")
        .about("Rolls(TEXT)->Fair/Loaded(TEXT) by the Viterbi algorithm")
        .setting(clap::AppSettings::ArgRequiredElseHelp)
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .multiple(true)
                .help("Debug mode"),
        )
        .arg(
            Arg::with_name("SEQUENCE")
                .index(1)
                .required_unless("simulate")
                .help("Rolls of a die, separated by whitespaces."),
        )
        .arg(
            Arg::with_name("STATES")
                .index(2)
                .help("True states, one character in each line. Only for display."),
        )
        .arg(
            Arg::with_name("model")
                .long("model")
                .short("m")
                .value_name("JSON")
                .takes_value(true)
                .help("Model parameters. The casino model if not supplied."),
        )
        .arg(
            Arg::with_name("width")
                .long("width")
                .takes_value(true)
                .default_value("60")
                .help("Number of labels in a line."),
        )
        .arg(
            Arg::with_name("simulate")
                .long("simulate")
                .value_name("LENGTH")
                .takes_value(true)
                .conflicts_with_all(&["SEQUENCE", "STATES"])
                .help("Decode rolls sampled from the model instead of a file."),
        )
        .arg(
            Arg::with_name("seed")
                .long("seed")
                .takes_value(true)
                .default_value("32389")
                .help("Seed for --simulate"),
        )
}

fn run(matches: &clap::ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let model = match matches.value_of("model") {
        Some(path) => Model::from_json_file(path)?,
        None => Model::default(),
    };
    debug!("Model\n{}", model);
    let width = value_t!(matches, "width", usize).unwrap_or_else(|e| e.exit());
    let (reference, sequence) = if matches.is_present("simulate") {
        let len = value_t!(matches, "simulate", usize).unwrap_or_else(|e| e.exit());
        let seed = value_t!(matches, "seed", u64).unwrap_or_else(|e| e.exit());
        let mut rng: Xoshiro256StarStar = SeedableRng::seed_from_u64(seed);
        let (path, rolls) = dicehmm::gen_seq::sample(&model, &mut rng, len)?;
        println!("Rolls:\n{}\n", render_rolls(&rolls, width));
        let reference: Vec<char> = render_path(&path, &model).chars().collect();
        (Some(reference), rolls)
    } else {
        // SEQUENCE is required unless --simulate.
        let sequence = match matches.value_of("SEQUENCE") {
            Some(path) => dicehmm::io::read_sequence(path)?,
            None => return Err("no sequence file".into()),
        };
        let reference = match matches.value_of("STATES") {
            Some(path) => Some(dicehmm::io::read_labels(path)?),
            None => None,
        };
        (reference, sequence)
    };
    if sequence.is_empty() {
        warn!("The sequence is empty.");
    }
    if let Some(reference) = reference.as_ref() {
        if reference.len() != sequence.len() {
            warn!(
                "{} labels for {} rolls. Only the overlapping part is compared.",
                reference.len(),
                sequence.len()
            );
        }
    }
    let decoded = dicehmm::decode_with_score(&sequence, &model)?;
    info!("Log-likelihood of the decoded path:{:.3}", decoded.log_prob);
    let decoded = render_path(&decoded.path, &model);
    if let Some(acc) = reference.as_ref().and_then(|r| agreement(r, &decoded)) {
        info!("Agreement with the reference:{:.3}", acc);
    }
    let stdout = std::io::stdout();
    let mut wtr = std::io::BufWriter::new(stdout.lock());
    write_report(&mut wtr, reference.as_deref(), &decoded, width)?;
    Ok(())
}

fn main() {
    let matches = app().get_matches();
    let level = match matches.occurrences_of("verbose") {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
    debug!("Start");
    if let Err(why) = run(&matches) {
        eprintln!("{}", why);
        std::process::exit(1);
    }
}

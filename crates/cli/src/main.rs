use clap::Parser;

mod args;
mod convert;
mod info;
mod sample;

fn main() -> anyhow::Result<()> {
    let args = args::Args::parse();

    let default_filter = if args.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match args.command {
        args::Commands::Info(a) => info::info_command(a),
        args::Commands::Convert(a) => convert::convert_command(a),
        args::Commands::Sample(a) => sample::sample_command(a),
    }
}

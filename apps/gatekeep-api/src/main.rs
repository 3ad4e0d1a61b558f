use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = gatekeep_api::Args::parse();

	gatekeep_api::run(args).await
}

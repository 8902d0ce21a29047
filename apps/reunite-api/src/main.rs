use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = reunite_api::Args::parse();
	reunite_api::run(args).await
}

use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = bank_api::Args::parse();
	bank_api::run(args).await
}

use serde::Serialize;
use tickerlens_core::Market;

use crate::cli::UniverseArgs;
use crate::error::CliError;
use crate::output::Table;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct UniverseResponseData {
    index: Market,
    count: usize,
    tickers: &'static [&'static str],
}

pub fn run(args: &UniverseArgs) -> Result<CommandResult, CliError> {
    let tickers = args.index.tickers();
    let data = serde_json::to_value(UniverseResponseData {
        index: args.index,
        count: tickers.len(),
        tickers,
    })?;

    let mut table = Table::new(vec!["TICKER"]).with_title(args.index.display_name());
    for ticker in tickers {
        table.push_row(vec![(*ticker).to_owned()]);
    }
    table.push_footer(format!("{} tickers", tickers.len()));

    Ok(CommandResult::new(data, table))
}

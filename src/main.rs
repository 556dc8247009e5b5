use anyhow::Context;
use football_sqlite::{bootstrap, Params, Schema, SqliteConfig, SqliteStore, CLUBS, PLAYERS};
use std::path::Path;

const CONFIG_FILE: &str = "football_db.toml";

fn main() -> anyhow::Result<()> {
    let config = if Path::new(CONFIG_FILE).exists() {
        SqliteConfig::load(CONFIG_FILE).with_context(|| format!("loading {CONFIG_FILE}"))?
    } else {
        SqliteConfig::default()
    };
    config.logging.init();

    let store = match SqliteStore::connect(&config, Schema::football()) {
        Ok(store) => store,
        Err(err) => {
            tracing::error!(error = %err, "could not open database");
            return Err(err.into());
        }
    };

    let outcome = bootstrap(&store)?;
    tracing::debug!(?outcome, "bootstrap finished");

    store.select_all(PLAYERS)?;
    store.select_where(CLUBS, &Params::new().with_value("name", "FC Barcelona"))?;
    store.update_row(PLAYERS, 2, &Params::new().with_value("position", "Winger"))?;

    store.close()?;
    Ok(())
}

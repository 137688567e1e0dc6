use clap::Args;
use mortgage_rules::engine::domain::RuleCategory;
use mortgage_rules::engine::facade::tool_specs;
use mortgage_rules::engine::repository::seed::default_rules;
use mortgage_rules::error::AppError;

#[derive(Args, Debug, Default)]
pub(crate) struct ToolsArgs {
    /// Print only the tool names, one per line
    #[arg(long)]
    pub(crate) names_only: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct SeedArgs {
    /// Restrict the listing to one category
    #[arg(long)]
    pub(crate) category: Option<String>,
}

pub(crate) fn run_tool_catalogue(args: ToolsArgs) -> Result<(), AppError> {
    let specs = tool_specs();
    if args.names_only {
        for spec in &specs {
            println!("{}", spec.name);
        }
        return Ok(());
    }

    let rendered = serde_json::to_string_pretty(&specs)
        .map_err(|err| AppError::Engine(mortgage_rules::engine::EngineError::Internal(err.to_string())))?;
    println!("{rendered}");
    Ok(())
}

pub(crate) fn run_seed_listing(args: SeedArgs) -> Result<(), AppError> {
    let category = match args.category.as_deref() {
        Some(raw) => Some(RuleCategory::parse(raw).ok_or_else(|| {
            AppError::Engine(mortgage_rules::engine::EngineError::Internal(format!(
                "unknown category '{raw}'"
            )))
        })?),
        None => None,
    };

    let rules: Vec<_> = default_rules()
        .into_iter()
        .filter(|rule| category.map_or(true, |wanted| rule.category == wanted))
        .collect();

    let rendered = serde_json::to_string_pretty(&rules)
        .map_err(|err| AppError::Engine(mortgage_rules::engine::EngineError::Internal(err.to_string())))?;
    println!("{rendered}");
    Ok(())
}

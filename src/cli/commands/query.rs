use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

use super::{CommandHandler, CommandResult};
use crate::catalog::{
    DateBound, FieldQuery, ListField, RegistryQuery, RegistryRecord, RegistryService, ScalarField,
    SortOrder,
};
use crate::cli::QueryArgs;
use crate::config::BuildConfig;
use crate::Result;

/// Handler for the `query` command
pub struct QueryCommand {
    pub config: BuildConfig,
    pub args: QueryArgs,
}

// Table row structure for record display
#[derive(Tabled)]
struct RecordTableRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Variant")]
    variant: String,
    #[tabled(rename = "Block")]
    block: String,
    #[tabled(rename = "Elements")]
    elements: String,
    #[tabled(rename = "Created")]
    created: String,
    #[tabled(rename = "Href")]
    href: String,
}

impl From<&RegistryRecord> for RecordTableRow {
    fn from(record: &RegistryRecord) -> Self {
        Self {
            name: record.name.clone(),
            variant: record.variant.clone(),
            block: format!(
                "{}/{}/{}",
                record.folder.website, record.folder.category, record.folder.block
            ),
            elements: record.elements.join(", "),
            created: record.created_at.format("%Y-%m-%d").to_string(),
            href: record.href.clone(),
        }
    }
}

impl QueryCommand {
    pub fn new(config: BuildConfig, args: QueryArgs) -> Self {
        Self { config, args }
    }

    /// Field filters expressed as an explicit per-field query
    fn field_query(&self) -> FieldQuery {
        let args = &self.args;
        let mut query = FieldQuery::new();
        let scalars = [
            (ScalarField::Website, &args.website),
            (ScalarField::Category, &args.category),
            (ScalarField::Block, &args.block),
            (ScalarField::Variant, &args.variant),
            (ScalarField::Name, &args.name),
        ];
        for (field, value) in scalars {
            if let Some(value) = value {
                query = query.equals(field, value.clone());
            }
        }
        if !args.tags.is_empty() {
            query = query.includes_all(ListField::Tags, args.tags.iter().cloned());
        }
        if !args.elements.is_empty() {
            query = query.includes_all(ListField::Elements, args.elements.iter().cloned());
        }
        if args.bookmarked {
            query = query.bookmarked(true);
        }
        query
    }

    /// Apply every filter, the sort and the limit
    pub fn select(&self, registry: &RegistryQuery) -> Result<RegistryQuery> {
        let mut selected = registry.matching(&self.field_query());

        match (&self.args.from, &self.args.to) {
            (Some(from), to) => {
                let to = to.as_deref().map(str::parse::<DateBound>).transpose()?;
                selected = selected.date_range(from.parse::<DateBound>()?, to);
            }
            (None, Some(to)) => {
                let to: DateBound = to.parse()?;
                selected = selected.filter(|r| r.created_at <= to.end_of_day());
            }
            (None, None) => {}
        }

        let order: SortOrder = self.args.order.parse()?;
        selected = selected.sort_by_date(order);

        if let Some(limit) = self.args.limit {
            selected = selected.take(limit);
        }
        Ok(selected)
    }

    fn print(&self, selected: &RegistryQuery) -> Result<()> {
        if self.args.json {
            println!("{}", serde_json::to_string_pretty(&selected.to_vec())?);
            return Ok(());
        }

        if selected.is_empty() {
            println!("No matching records");
            return Ok(());
        }

        let rows: Vec<RecordTableRow> = selected.iter().map(RecordTableRow::from).collect();
        let table = Table::new(&rows)
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()))
            .to_string();
        println!("Found {} records\n", selected.len());
        println!("{table}");
        Ok(())
    }
}

impl CommandHandler for QueryCommand {
    fn execute(&self) -> Result<CommandResult> {
        let service = RegistryService::from_file(self.config.registry_path());
        let selected = self.select(service.load()?)?;
        self.print(&selected)?;
        Ok(CommandResult::Success(None))
    }

    fn name(&self) -> &'static str {
        "query"
    }
}

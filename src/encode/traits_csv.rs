use crate::catalog::model::Catalog;
use crate::generate::generator::GeneratedItem;

/// Trait table: one `ID` column, then one column per layer in catalog order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TraitTable {
    /// `ID` followed by layer names.
    pub header: Vec<String>,
    /// One row per item in acceptance order: 1-based position, then the trait per layer.
    pub rows: Vec<Vec<String>>,
}

impl TraitTable {
    /// Tabulate `items` against `catalog`'s layer order.
    ///
    /// Traits are looked up by layer name; a layer with no matching trait gets an empty field.
    pub fn build(catalog: &Catalog, items: &[GeneratedItem]) -> Self {
        let header = std::iter::once("ID".to_string())
            .chain(catalog.layer_names().map(str::to_string))
            .collect();

        let rows = items
            .iter()
            .enumerate()
            .map(|(pos, item)| {
                std::iter::once((pos + 1).to_string())
                    .chain(catalog.layer_names().map(|layer| {
                        item.traits
                            .iter()
                            .find(|t| t.layer == layer)
                            .map(|t| t.trait_name.clone())
                            .unwrap_or_default()
                    }))
                    .collect()
            })
            .collect();

        Self { header, rows }
    }

    /// Render as CSV: rows joined by `\n`, no trailing newline.
    pub fn to_csv(&self) -> String {
        std::iter::once(&self.header)
            .chain(self.rows.iter())
            .map(|row| {
                row.iter()
                    .map(|field| escape_field(field))
                    .collect::<Vec<_>>()
                    .join(",")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// RFC 4180 quoting: fields holding `,`, `"`, CR or LF are quoted with inner quotes doubled.
pub fn escape_field(field: &str) -> std::borrow::Cow<'_, str> {
    if field.contains([',', '"', '\r', '\n']) {
        std::borrow::Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        std::borrow::Cow::Borrowed(field)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/traits_csv.rs"]
mod tests;

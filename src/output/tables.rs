use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color as TableColor, ContentArrangement, Table};

use super::styling::parse_hex;

/// Table and cell creation helpers
pub fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn table_color(hex: &str) -> Option<TableColor> {
    parse_hex(hex).map(|(r, g, b)| TableColor::Rgb { r, g, b })
}

pub fn colored_cell(text: impl ToString, hex: &str) -> Cell {
    let cell = Cell::new(text.to_string());
    match table_color(hex) {
        Some(color) => cell.fg(color),
        None => cell,
    }
}

pub fn header_cell(text: impl ToString, hex: &str) -> Cell {
    colored_cell(text, hex).add_attribute(Attribute::Bold)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_color() {
        assert_eq!(
            table_color("#a6e3a1"),
            Some(TableColor::Rgb {
                r: 0xa6,
                g: 0xe3,
                b: 0xa1
            })
        );
        assert_eq!(table_color("green"), None);
    }

    #[test]
    fn test_create_table_renders_rows() {
        let mut table = create_table();
        table.set_header(vec![header_cell("Stage", "#cba6f7")]);
        table.add_row(vec![colored_cell("build", "not-a-colour")]);

        let rendered = table.to_string();
        assert!(rendered.contains("Stage"));
        assert!(rendered.contains("build"));
    }
}

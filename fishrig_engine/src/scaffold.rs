//! Default content for a queue file that doesn't exist yet.

use crate::catalog::Catalog;

const HEADER: &[&str] = &[
    "#This file was generated by FishRigging. Leave it without uncommented lines to disable this feature. Everything starting with a hashtag is a comment",
    "#",
    "#If FishRigging is active, every catch is taken from the topmost line of this file",
    "#Once an item has been caught, this file will update and remove the topmost item from your list",
    "#If there is an error, the file will show you which line and what the error is",
    "#",
    "#Some items require damage values and or enchantments. The syntax for that is as follows:",
    "#",
    "#<item_name>;damage:<damage_value>;enchant:<first_enchantment_name>[<ench_level>],<second_enchantment_name>[<ench_level>]",
    "#",
    "#Example: fishing_rod_treasure;damage:0;enchant:unbreaking[1],lure[3]",
    "#",
    "#",
    "#-----------------------------Possible items-----------------------------",
    "#",
    "#",
];

const NOTE_PADDING: &str = "\t\t\t\t\t\t\t\t";

/// Build the commented-out scaffold: usage notes followed by one line per catalog entry.
pub fn scaffold_lines(catalog: &Catalog) -> Vec<String> {
    let mut lines: Vec<String> = HEADER.iter().map(ToString::to_string).collect();
    lines.extend(catalog.entries().iter().map(|entry| match &entry.note {
        Some(note) => format!("#{}{NOTE_PADDING}#{note}", entry.name),
        None => format!("#{}", entry.name),
    }));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line::{QueueLine, classify};

    #[test]
    fn scaffold_is_all_comments() {
        let (catalog, _) = Catalog::builtin();
        let lines = scaffold_lines(&catalog);
        assert!(lines.iter().map(|l| classify(l)).all(|l| matches!(l, QueueLine::Comment(_))));
    }

    #[test]
    fn scaffold_lists_every_entry_with_notes() {
        let (catalog, _) = Catalog::builtin();
        let lines = scaffold_lines(&catalog);
        assert_eq!(lines.len(), HEADER.len() + catalog.len());
        assert!(lines.contains(&"#cod".to_string()));
        assert!(
            lines
                .iter()
                .any(|l| l.starts_with("#leather_boots\t") && l.ends_with("#Possible damage: 0-58, This item can't be enchanted, Example: leather_boots;damage:0"))
        );
    }
}

//! Citation export: RIS, BibTeX and APS
//!
//! All formatters are pure functions of a [`PaperRecord`]. Absent or blank
//! fields are left out entirely rather than emitted empty.

use crate::models::PaperRecord;
use crate::{Error, Result};

const RIS_SEPARATOR: &str = "  - ";
const FORMULA_NOTE_PREFIX: &str = "Chemical formula: ";

/// Maximum authors listed in an APS citation
pub const APS_MAX_AUTHORS: usize = 10;

/// Full journal name → APS abbreviation, matched exactly and then by substring
const JOURNAL_ABBREVIATIONS: &[(&str, &str)] = &[
    ("Physical Review Letters", "Phys. Rev. Lett."),
    ("Physical Review B", "Phys. Rev. B"),
    ("Physical Review A", "Phys. Rev. A"),
    ("Physical Review X", "Phys. Rev. X"),
    ("Physical Review", "Phys. Rev."),
    ("Physical Review Applied", "Phys. Rev. Appl."),
    ("Physical Review Materials", "Phys. Rev. Mater."),
    ("Nature", "Nature"),
    ("Nature Physics", "Nat. Phys."),
    ("Nature Materials", "Nat. Mater."),
    ("Nature Communications", "Nat. Commun."),
    ("Nature Chemistry", "Nat. Chem."),
    ("Science", "Science"),
    ("Science Advances", "Sci. Adv."),
    ("Advanced Materials", "Adv. Mater."),
    ("Advanced Functional Materials", "Adv. Funct. Mater."),
    ("Applied Physics Letters", "Appl. Phys. Lett."),
    ("Journal of Applied Physics", "J. Appl. Phys."),
    ("Journal of Physics", "J. Phys."),
    ("Materials Today", "Mater. Today"),
    ("Matter and Radiation at Extremes", "Matter Radiat. Extremes"),
    ("National Science Review", "Natl. Sci. Rev."),
    ("Physics Reports", "Phys. Rep."),
    ("The Innovation", "The Innovation"),
    ("WIREs Computational Molecular Science", "WIREs Comput. Mol. Sci."),
];

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Any run of whitespace, line breaks included, becomes one space
fn single_line(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn ris_line(out: &mut Vec<String>, tag: &str, value: Option<&str>) {
    if let Some(value) = non_blank(value) {
        out.push(format!("{}{}{}", tag, RIS_SEPARATOR, single_line(value)));
    }
}

/// One RIS record, `TY` through `ER`, without a trailing newline
pub fn to_ris(record: &PaperRecord) -> String {
    let mut lines = vec![format!("TY{}JOUR", RIS_SEPARATOR)];

    for author in &record.authors {
        ris_line(&mut lines, "AU", Some(author.as_str()));
    }
    ris_line(&mut lines, "TI", Some(record.title.as_str()));
    ris_line(&mut lines, "JO", record.journal.as_deref());
    let year = record.year.map(|y| y.to_string());
    ris_line(&mut lines, "PY", year.as_deref());
    ris_line(&mut lines, "VL", record.volume.as_deref());
    ris_line(&mut lines, "IS", record.issue.as_deref());
    ris_line(&mut lines, "SP", record.pages.as_deref());
    ris_line(&mut lines, "DO", Some(record.doi.as_str()));
    if let Some(formula) = non_blank(record.chemical_formula.as_deref()) {
        lines.push(format!(
            "N1{}{}{}",
            RIS_SEPARATOR,
            FORMULA_NOTE_PREFIX,
            single_line(formula)
        ));
    }
    lines.push(format!("ER{}", RIS_SEPARATOR));

    lines.join("\n")
}

/// Several RIS records separated by a blank line
pub fn to_ris_batch<'a>(records: impl IntoIterator<Item = &'a PaperRecord>) -> String {
    records
        .into_iter()
        .map(to_ris)
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Read records written by [`to_ris`] / [`to_ris_batch`]
///
/// Only the tags this module writes are interpreted; other tags are skipped.
/// Parsed records get id 0.
pub fn parse_ris(input: &str) -> Result<Vec<PaperRecord>> {
    let mut records = Vec::new();
    let mut current: Option<PaperRecord> = None;

    for (index, raw_line) in input.lines().enumerate() {
        let line = raw_line.trim_end();
        if line.trim().is_empty() {
            continue;
        }

        let (tag, value) = split_ris_line(line).ok_or_else(|| {
            Error::InvalidInput(format!("RIS line {}: not a tagged line", index + 1))
        })?;

        match tag {
            "TY" => {
                if current.is_some() {
                    return Err(Error::InvalidInput(format!(
                        "RIS line {}: TY before ER",
                        index + 1
                    )));
                }
                current = Some(PaperRecord::new(0, String::new(), String::new()));
            }
            "ER" => {
                let record = current.take().ok_or_else(|| {
                    Error::InvalidInput(format!("RIS line {}: ER without TY", index + 1))
                })?;
                records.push(record);
            }
            _ => {
                let record = current.as_mut().ok_or_else(|| {
                    Error::InvalidInput(format!("RIS line {}: {} outside a record", index + 1, tag))
                })?;
                apply_ris_field(record, tag, value);
            }
        }
    }

    if current.is_some() {
        return Err(Error::InvalidInput("RIS record missing ER".to_string()));
    }

    Ok(records)
}

fn split_ris_line(line: &str) -> Option<(&str, &str)> {
    let tag = line.get(..2)?;
    let rest = line.get(2..)?;
    let value = rest.strip_prefix("  -")?;
    Some((tag, value.trim()))
}

fn apply_ris_field(record: &mut PaperRecord, tag: &str, value: &str) {
    let text = || (!value.is_empty()).then(|| value.to_string());
    match tag {
        "AU" => {
            if !value.is_empty() {
                record.authors.push(value.to_string());
            }
        }
        "TI" => record.title = value.to_string(),
        "JO" => record.journal = text(),
        "PY" => record.year = value.parse().ok(),
        "VL" => record.volume = text(),
        "IS" => record.issue = text(),
        "SP" => record.pages = text(),
        "DO" => record.doi = value.to_string(),
        "N1" => {
            if let Some(formula) = value.strip_prefix(FORMULA_NOTE_PREFIX) {
                record.chemical_formula = Some(formula.trim().to_string());
            }
        }
        _ => {}
    }
}

/// "Albert Einstein" → "A. Einstein"
fn abbreviate_name(full_name: &str) -> String {
    let parts: Vec<&str> = full_name.split_whitespace().collect();
    match parts.split_last() {
        None => String::new(),
        Some((last, [])) => last.to_string(),
        Some((last, given)) => {
            let mut out: Vec<String> = given
                .iter()
                .filter_map(|p| p.chars().next())
                .map(|c| format!("{}.", c))
                .collect();
            out.push(last.to_string());
            out.join(" ")
        }
    }
}

fn format_aps_authors(authors: &[String]) -> String {
    let names: Vec<String> = authors
        .iter()
        .filter(|a| !a.trim().is_empty())
        .take(APS_MAX_AUTHORS)
        .map(|a| abbreviate_name(a))
        .collect();

    match names.as_slice() {
        [] => String::new(),
        [one] => one.clone(),
        [first, second] => format!("{} and {}", first, second),
        [head @ .., last] => format!("{}, and {}", head.join(", "), last),
    }
}

/// APS abbreviation for a journal name, or the name unchanged
pub fn abbreviate_journal(journal: &str) -> &str {
    let lowered = journal.to_lowercase();

    JOURNAL_ABBREVIATIONS
        .iter()
        .find(|(full, _)| full.to_lowercase() == lowered)
        .or_else(|| {
            JOURNAL_ABBREVIATIONS
                .iter()
                .find(|(full, _)| lowered.contains(&full.to_lowercase()))
        })
        .map(|(_, abbr)| *abbr)
        .unwrap_or(journal)
}

/// APS-style reference, e.g. `A. B. Smith and C. Jones, Title, Phys. Rev. B 99, 1 (2019).`
pub fn to_aps(record: &PaperRecord) -> String {
    let mut parts = Vec::new();

    let authors = format_aps_authors(&record.authors);
    if !authors.is_empty() {
        parts.push(authors);
    }

    let title = record.title.trim();
    if !title.is_empty() {
        parts.push(title.to_string());
    }

    let journal = non_blank(record.journal.as_deref());
    let volume = non_blank(record.volume.as_deref());
    let pages = non_blank(record.pages.as_deref());
    match (journal, volume, pages, record.year) {
        (Some(journal), Some(volume), Some(pages), Some(year)) => parts.push(format!(
            "{} {}, {} ({})",
            abbreviate_journal(journal),
            volume,
            pages,
            year
        )),
        (Some(journal), _, _, Some(year)) => parts.push(format!("{} ({})", journal, year)),
        (None, _, _, Some(year)) => parts.push(format!("({})", year)),
        _ => {}
    }

    if parts.is_empty() {
        "Unknown article".to_string()
    } else {
        format!("{}.", parts.join(", "))
    }
}

/// `LastnameYear` from the first author, letters only
pub fn bibtex_key(record: &PaperRecord) -> String {
    let last_name: String = record
        .first_author()
        .and_then(|a| a.split_whitespace().last())
        .map(|name| name.chars().filter(|c| c.is_ascii_alphabetic()).collect())
        .unwrap_or_default();
    let last_name = if last_name.is_empty() {
        "Unknown".to_string()
    } else {
        last_name
    };

    let year = record
        .year
        .map(|y| y.to_string())
        .unwrap_or_else(|| "0000".to_string());

    format!("{}{}", last_name, year)
}

fn format_bibtex_authors(authors: &[String]) -> String {
    authors
        .iter()
        .filter(|a| !a.trim().is_empty())
        .map(|author| {
            let parts: Vec<&str> = author.split_whitespace().collect();
            match parts.split_last() {
                Some((last, given)) if !given.is_empty() => {
                    format!("{}, {}", last, given.join(" "))
                }
                _ => author.trim().to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join(" and ")
}

/// BibTeX `@article` entry
pub fn to_bibtex(record: &PaperRecord) -> String {
    let mut fields = Vec::new();

    let authors = format_bibtex_authors(&record.authors);
    if !authors.is_empty() {
        fields.push(("author", authors));
    }
    let year = record.year.map(|y| y.to_string());
    let optional = [
        ("title", Some(record.title.as_str())),
        ("journal", record.journal.as_deref()),
        ("volume", record.volume.as_deref()),
        ("pages", record.pages.as_deref()),
        ("year", year.as_deref()),
        ("doi", Some(record.doi.as_str())),
    ];
    for (name, value) in optional {
        if let Some(value) = non_blank(value) {
            fields.push((name, value.to_string()));
        }
    }

    let body = fields
        .iter()
        .map(|(name, value)| format!("  {} = {{{}}}", name, value))
        .collect::<Vec<_>>()
        .join(",\n");

    if body.is_empty() {
        format!("@article{{{},\n}}", bibtex_key(record))
    } else {
        format!("@article{{{},\n{}\n}}", bibtex_key(record), body)
    }
}

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::args::SourceFormat;
use crate::chapters;
use crate::record::IcdCodeRecord;

/// Convert raw source text into canonical records. The three source formats
/// differ only in how chapter metadata is derived: the tabular XML carries
/// chapter titles and ordering in the document itself, while the flat TXT
/// and CSV formats infer the chapter from the code prefix.
pub fn parse_records(format: SourceFormat, raw: &str) -> Result<Vec<IcdCodeRecord>> {
    match format {
        SourceFormat::Xml => parse_tabular_xml(raw),
        SourceFormat::Txt => Ok(parse_codes_txt(raw)),
        SourceFormat::Csv => parse_codes_csv(raw),
    }
}

#[derive(Debug, Deserialize)]
struct Tabular {
    #[serde(rename = "chapter", default)]
    chapters: Vec<ChapterNode>,
}

#[derive(Debug, Deserialize)]
struct ChapterNode {
    desc: Option<String>,
    #[serde(rename = "section", default)]
    sections: Vec<SectionNode>,
    #[serde(rename = "diag", default)]
    diags: Vec<DiagNode>,
}

#[derive(Debug, Deserialize)]
struct SectionNode {
    #[serde(rename = "diag", default)]
    diags: Vec<DiagNode>,
}

#[derive(Debug, Deserialize)]
struct DiagNode {
    name: Option<String>,
    desc: Option<String>,
    #[serde(rename = "diag", default)]
    children: Vec<DiagNode>,
}

fn parse_tabular_xml(raw: &str) -> Result<Vec<IcdCodeRecord>> {
    let tabular: Tabular =
        quick_xml::de::from_str(raw).context("Failed parsing ICD-10-CM tabular XML")?;

    let mut records = Vec::new();
    for (index, chapter) in tabular.chapters.iter().enumerate() {
        let chapter_number = (index + 1) as u32;
        let chapter_title = chapter
            .desc
            .as_deref()
            .map(str::trim)
            .filter(|title| !title.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Chapter {chapter_number}"));

        for diag in &chapter.diags {
            collect_diags(diag, &chapter_title, chapter_number, &mut records);
        }
        for section in &chapter.sections {
            for diag in &section.diags {
                collect_diags(diag, &chapter_title, chapter_number, &mut records);
            }
        }
    }
    Ok(records)
}

fn collect_diags(
    diag: &DiagNode,
    chapter_title: &str,
    chapter_number: u32,
    records: &mut Vec<IcdCodeRecord>,
) {
    // Entries missing the code or description are dropped, but their
    // children may still be complete, so the walk always descends.
    let code = diag.name.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let desc = diag.desc.as_deref().map(str::trim).filter(|s| !s.is_empty());
    if let (Some(code), Some(desc)) = (code, desc) {
        records.push(IcdCodeRecord::build(code, desc, chapter_title, chapter_number));
    }

    for child in &diag.children {
        collect_diags(child, chapter_title, chapter_number, records);
    }
}

fn parse_codes_txt(raw: &str) -> Vec<IcdCodeRecord> {
    let mut records = Vec::new();
    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((code, rest)) = line.split_once(char::is_whitespace) else {
            continue;
        };
        let description = rest.trim();
        if description.is_empty() {
            continue;
        }

        let (chapter_number, chapter_title) = chapters::classify(code);
        records.push(IcdCodeRecord::build(
            code,
            description,
            chapter_title,
            chapter_number,
        ));
    }
    records
}

fn parse_codes_csv(raw: &str) -> Result<Vec<IcdCodeRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(raw.as_bytes());

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.context("Failed reading row from codes CSV")?;
        let code = row.get(0).map(str::trim).unwrap_or("");
        let description = row.get(1).map(str::trim).unwrap_or("");
        if code.is_empty() || description.is_empty() {
            continue;
        }

        let (chapter_number, chapter_title) = chapters::classify(code);
        records.push(IcdCodeRecord::build(
            code,
            description,
            chapter_title,
            chapter_number,
        ));
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABULAR_SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ICD10CM.tabular>
  <chapter>
    <name>1</name>
    <desc>Certain infectious and parasitic diseases (A00-B99)</desc>
    <section id="A00-A09">
      <diag>
        <name>A00</name>
        <desc>Cholera</desc>
        <diag>
          <name>A00.0</name>
          <desc>Cholera due to Vibrio cholerae 01, biovar cholerae</desc>
        </diag>
        <diag>
          <name>A00.1</name>
          <desc>Cholera due to Vibrio cholerae 01, biovar eltor</desc>
        </diag>
      </diag>
    </section>
  </chapter>
  <chapter>
    <name>2</name>
    <desc>Neoplasms (C00-D49)</desc>
    <section id="C00-C14">
      <diag>
        <name>C00</name>
        <desc>Malignant neoplasm of lip</desc>
      </diag>
    </section>
  </chapter>
</ICD10CM.tabular>
"#;

    #[test]
    fn tabular_xml_takes_chapter_metadata_from_document_order() {
        let records = parse_records(SourceFormat::Xml, TABULAR_SAMPLE).unwrap();
        assert_eq!(records.len(), 4);
        assert_eq!(records[0].code, "A00");
        assert_eq!(records[1].code, "A00.0");
        assert_eq!(records[2].code, "A00.1");
        assert_eq!(records[0].chapter_number, Some(1));
        assert_eq!(
            records[0].chapter,
            "Certain infectious and parasitic diseases (A00-B99)"
        );
        assert_eq!(records[3].code, "C00");
        assert_eq!(records[3].chapter_number, Some(2));
        assert_eq!(records[3].chapter, "Neoplasms (C00-D49)");
    }

    #[test]
    fn tabular_xml_applies_record_derivation_rules() {
        let records = parse_records(SourceFormat::Xml, TABULAR_SAMPLE).unwrap();
        assert!(records[0].is_header);
        assert_eq!(records[0].parent_code, None);
        assert!(records[1].is_billable);
        assert_eq!(records[1].parent_code.as_deref(), Some("A00"));
    }

    #[test]
    fn tabular_xml_skips_incomplete_entries_but_keeps_their_children() {
        let raw = r#"<ICD10CM.tabular>
  <chapter>
    <desc>Neoplasms</desc>
    <section>
      <diag>
        <name>C01</name>
        <diag>
          <name>C01.1</name>
          <desc>Child under a description-less parent</desc>
        </diag>
      </diag>
      <diag>
        <desc>Code-less entry</desc>
      </diag>
    </section>
  </chapter>
</ICD10CM.tabular>"#;
        let records = parse_records(SourceFormat::Xml, raw).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].code, "C01.1");
    }

    #[test]
    fn tabular_xml_falls_back_to_positional_chapter_title() {
        let raw = r#"<ICD10CM.tabular>
  <chapter>
    <section>
      <diag><name>A00</name><desc>Cholera</desc></diag>
    </section>
  </chapter>
</ICD10CM.tabular>"#;
        let records = parse_records(SourceFormat::Xml, raw).unwrap();
        assert_eq!(records[0].chapter, "Chapter 1");
    }

    #[test]
    fn codes_txt_splits_on_first_whitespace_run() {
        let raw = "A000  Cholera due to Vibrio cholerae 01, biovar cholerae\n\
                   A001\tCholera due to Vibrio cholerae 01, biovar eltor\n";
        let records = parse_records(SourceFormat::Txt, raw).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].code, "A000");
        assert_eq!(
            records[0].long_description,
            "Cholera due to Vibrio cholerae 01, biovar cholerae"
        );
        assert_eq!(records[0].chapter_number, Some(1));
        assert_eq!(records[1].code, "A001");
    }

    #[test]
    fn codes_txt_skips_blanks_comments_and_single_field_lines() {
        let raw = "\n# header comment\nA000 Cholera\nB99\n   \n";
        let records = parse_records(SourceFormat::Txt, raw).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].code, "A000");
    }

    #[test]
    fn codes_txt_derives_chapter_from_prefix_table() {
        let raw = "Z000 Encounter for general adult medical examination\n\
                   9999 Not a real code\n";
        let records = parse_records(SourceFormat::Txt, raw).unwrap();
        assert_eq!(records[0].chapter_number, Some(21));
        assert_eq!(records[1].chapter_number, Some(99));
        assert_eq!(records[1].chapter, "Unknown chapter");
    }

    #[test]
    fn codes_csv_skips_header_row_and_handles_quotes() {
        let raw = "code,description\n\
                   A00.0,\"Cholera due to Vibrio cholerae 01, biovar cholerae\"\n\
                   ,missing code\n\
                   C00.1,Malignant neoplasm of external lower lip\n";
        let records = parse_records(SourceFormat::Csv, raw).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].code, "A00.0");
        assert_eq!(
            records[0].long_description,
            "Cholera due to Vibrio cholerae 01, biovar cholerae"
        );
        assert_eq!(records[1].chapter_number, Some(2));
    }

    #[test]
    fn short_title_rule_is_uniform_across_formats() {
        let long_desc = "d".repeat(80);
        let txt = format!("A000 {long_desc}\n");
        let csv = format!("code,description\nA00.0,{long_desc}\n");
        let txt_records = parse_records(SourceFormat::Txt, &txt).unwrap();
        let csv_records = parse_records(SourceFormat::Csv, &csv).unwrap();
        assert_eq!(txt_records[0].short_title.chars().count(), 63);
        assert_eq!(txt_records[0].short_title, csv_records[0].short_title);
    }
}

pub const DEFAULT_TABLE: &str = "icd10_codes";
pub const GITHUB_CODES_CSV_URL: &str =
    "https://raw.githubusercontent.com/kamillamagna/ICD-10-CSV/master/codes.csv";
pub const WHO_CODES_FILE: &str = "LinearizationMiniOutput-MMS-en.txt";

pub const WHO_DOWNLOAD_INFO: &str = "\
The WHO ICD-10 dataset is free but requires a manual download:
  1. Go to https://icd.who.int/browse10/Downloads
  2. Accept the license agreement
  3. Download \"ICD-10 Version 2019\" (LinearizationMiniOutput-MMS-en.zip)
  4. Extract into data/who_icd10/
  5. Re-run this tool with --dataset who";

pub fn cdc_tabular_url(year: u16) -> String {
    format!(
        "https://ftp.cdc.gov/pub/Health_Statistics/NCHS/Publications/ICD10CM/{year}/icd10cm_tabular_{year}.xml"
    )
}

pub fn cdc_codes_txt_url(year: u16) -> String {
    format!(
        "https://ftp.cdc.gov/pub/Health_Statistics/NCHS/Publications/ICD10CM/{year}/icd10cm_codes_{year}.txt"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cdc_urls_are_templated_by_year() {
        assert_eq!(
            cdc_tabular_url(2024),
            "https://ftp.cdc.gov/pub/Health_Statistics/NCHS/Publications/ICD10CM/2024/icd10cm_tabular_2024.xml"
        );
        assert!(cdc_codes_txt_url(2025).ends_with("/2025/icd10cm_codes_2025.txt"));
    }
}

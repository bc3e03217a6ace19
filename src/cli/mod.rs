//! Interactive numbered menu over the query engine.

use crate::engine::query::{parse_year_input, QueryKind};
use crate::engine::QueryEngine;
use std::io::{self, BufRead, Write};

const RULE: &str = "==================================================";
const THIN_RULE: &str = "------------------------------";

/// Map loose user input onto a known company: case-insensitive substring
/// match in either direction. Unmatched or blank input is returned as typed.
pub fn resolve_company(input: &str, companies: &[String]) -> String {
    let needle = input.trim();
    if needle.is_empty() {
        return needle.to_string();
    }
    let lower = needle.to_lowercase();
    companies
        .iter()
        .find(|c| {
            let c = c.to_lowercase();
            c.contains(&lower) || lower.contains(&c)
        })
        .cloned()
        .unwrap_or_else(|| needle.to_string())
}

pub fn format_companies(companies: &[String]) -> String {
    format!("可用公司: {}", companies.join(", "))
}

pub fn format_years(years: &[i32]) -> String {
    let years: Vec<String> = years.iter().map(|y| y.to_string()).collect();
    format!("可用年份: {}", years.join(", "))
}

pub struct Menu<'a, R, W> {
    engine: &'a QueryEngine,
    input: R,
    out: W,
}

impl<'a, R: BufRead, W: Write> Menu<'a, R, W> {
    pub fn new(engine: &'a QueryEngine, input: R, out: W) -> Self {
        Self { engine, input, out }
    }

    /// `None` at end of input.
    fn prompt(&mut self, label: &str) -> io::Result<Option<String>> {
        write!(self.out, "{label}")?;
        self.out.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn display_menu(&mut self) -> io::Result<()> {
        writeln!(self.out, "\n{RULE}")?;
        writeln!(self.out, "🤖 財務數據聊天機器人")?;
        writeln!(self.out, "{RULE}")?;
        writeln!(self.out, "可用的查詢選項：")?;
        for (i, kind) in QueryKind::ALL.iter().enumerate() {
            writeln!(self.out, "{}. {}", i + 1, kind.description())?;
        }
        writeln!(self.out, "6. 查看可用公司列表")?;
        writeln!(self.out, "7. 查看可用年份列表")?;
        writeln!(self.out, "0. 退出")?;
        writeln!(self.out, "{RULE}")
    }

    fn company_input(&mut self) -> io::Result<Option<String>> {
        let companies = self.engine.available_companies();
        writeln!(self.out, "{}", format_companies(&companies))?;
        Ok(self
            .prompt("請輸入公司名稱: ")?
            .map(|typed| resolve_company(&typed, &companies)))
    }

    /// `Ok(None)` covers both end of input and an invalid year; the latter
    /// is reported before returning.
    fn year_input(&mut self) -> io::Result<Option<i32>> {
        writeln!(self.out, "{}", format_years(&self.engine.available_years()))?;
        let Some(typed) = self.prompt("請輸入年份: ")? else {
            return Ok(None);
        };
        match parse_year_input(&typed) {
            Ok(Some(year)) => Ok(Some(year)),
            Ok(None) | Err(_) => {
                writeln!(self.out, "請輸入有效的年份數字")?;
                Ok(None)
            }
        }
    }

    /// Collect parameters and answer one menu choice. `None` means nothing
    /// to print (input ended or the year was rejected).
    fn process(&mut self, kind: QueryKind) -> io::Result<Option<String>> {
        let company = if kind.needs_company() {
            match self.company_input()? {
                Some(c) => Some(c),
                None => return Ok(None),
            }
        } else {
            None
        };
        let year = if kind.needs_year() {
            match self.year_input()? {
                Some(y) => Some(y),
                None => return Ok(None),
            }
        } else {
            None
        };
        Ok(Some(self.engine.dispatch(kind, company.as_deref(), year)))
    }

    pub fn run(&mut self) -> io::Result<()> {
        writeln!(self.out, "歡迎使用財務數據聊天機器人！")?;
        let companies = self.engine.available_companies().join("、");
        writeln!(self.out, "我可以幫您查詢 {companies} 的財務資訊。")?;

        loop {
            self.display_menu()?;
            let Some(choice) = self.prompt("\n請選擇查詢選項 (0-7): ")? else {
                break;
            };

            let response = match choice.as_str() {
                "0" => {
                    writeln!(self.out, "謝謝使用！再見！")?;
                    break;
                }
                "6" => Some(format_companies(&self.engine.available_companies())),
                "7" => Some(format_years(&self.engine.available_years())),
                other => match other.parse::<usize>().ok().filter(|n| (1..=5).contains(n)) {
                    Some(n) => {
                        writeln!(self.out, "\n{THIN_RULE}")?;
                        self.process(QueryKind::ALL[n - 1])?
                    }
                    None => {
                        writeln!(self.out, "無效選項，請重新選擇。")?;
                        continue;
                    }
                },
            };

            if let Some(response) = response {
                writeln!(self.out, "{response}")?;
            }
            writeln!(self.out, "{THIN_RULE}")?;
            if self.prompt("\n按 Enter 繼續...")?.is_none() {
                break;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::tests::sample_engine;
    use std::io::Cursor;

    fn run_menu(script: &str) -> String {
        let engine = sample_engine();
        let mut out = Vec::new();
        Menu::new(&engine, Cursor::new(script.to_string()), &mut out)
            .run()
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    fn companies() -> Vec<String> {
        ["Apple", "Tesla", "Microsoft"].map(String::from).to_vec()
    }

    #[test]
    fn test_resolve_company() {
        let known = companies();
        assert_eq!(resolve_company("apple", &known), "Apple");
        assert_eq!(resolve_company("micro", &known), "Microsoft");
        assert_eq!(resolve_company("Tesla Inc", &known), "Tesla");
        assert_eq!(resolve_company("Google", &known), "Google");
        assert_eq!(resolve_company("  ", &known), "");
    }

    #[test]
    fn test_format_catalogs() {
        assert_eq!(format_companies(&companies()), "可用公司: Apple, Tesla, Microsoft");
        assert_eq!(format_years(&[2021, 2022]), "可用年份: 2021, 2022");
    }

    #[test]
    fn test_menu_revenue_query_with_fuzzy_company() {
        let out = run_menu("1\napple\n2022\n\n0\n");
        assert!(out.contains("Apple在2022年的總營收為 $394,328 百萬美元"));
        assert!(out.contains("謝謝使用！再見！"));
    }

    #[test]
    fn test_menu_invalid_year_skips_query() {
        let out = run_menu("3\nsoon\n\n0\n");
        assert!(out.contains("請輸入有效的年份數字"));
        assert!(!out.contains("營收最高的公司是"));
    }

    #[test]
    fn test_menu_catalog_and_invalid_choice() {
        let out = run_menu("7\n\n9\n0\n");
        assert!(out.contains("可用年份: 2021, 2022, 2023"));
        assert!(out.contains("無效選項，請重新選擇。"));
    }

    #[test]
    fn test_menu_stops_at_end_of_input() {
        let out = run_menu("2\nTesla\n");
        assert!(out.contains("Tesla的淨利從2021年到2022年增長了127.5%"));
        assert!(!out.contains("謝謝使用"));
    }
}

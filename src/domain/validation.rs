use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};

use super::errors::ValidationErrors;
use super::value_objects::{DATE_OF_ISSUE_FORMAT, MAX_STRING_LENGTH};

/// フィールドの必須性
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// 値が必須（作成時）
    Required,
    /// 省略・null可（更新時）。省略されたフィールドは検証しない
    Nullable,
}

/// フィールドの制約
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    /// 文字列であること
    String,
    /// 最大文字数
    MaxLength(usize),
    /// 日付として解釈できること
    Date,
    /// 指定フォーマット（chrono形式）に一致すること
    DateFormat(&'static str),
    /// テーブル内で一意であること（判定は永続化層に委ねる）
    Unique(UniqueIndex),
}

/// 一意性を判定するインデックス
///
/// 判定側はこの列挙をすべて網羅して問い合わせ先を決める。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueIndex {
    /// books.title
    BookTitle,
}

/// スキーマの1エントリ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRule {
    pub field: &'static str,
    pub presence: Presence,
    pub constraints: Vec<Constraint>,
}

impl FieldRule {
    pub fn new(field: &'static str, presence: Presence, constraints: Vec<Constraint>) -> Self {
        Self {
            field,
            presence,
            constraints,
        }
    }
}

/// 宣言的なバリデーションスキーマ
///
/// エントリは定義順に評価され、エラーマップのフィールド順もこれに従う。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    rules: Vec<FieldRule>,
}

impl Schema {
    pub fn new(rules: Vec<FieldRule>) -> Self {
        Self { rules }
    }

    /// 書籍作成用スキーマ（全フィールド必須）
    pub fn book_create() -> Self {
        Self::book(Presence::Required)
    }

    /// 書籍更新用スキーマ（全フィールド省略可）
    pub fn book_update() -> Self {
        Self::book(Presence::Nullable)
    }

    fn book(presence: Presence) -> Self {
        let bounded_string = || {
            vec![
                Constraint::String,
                Constraint::MaxLength(MAX_STRING_LENGTH),
            ]
        };

        Self::new(vec![
            FieldRule::new(
                "title",
                presence,
                vec![
                    Constraint::String,
                    Constraint::MaxLength(MAX_STRING_LENGTH),
                    Constraint::Unique(UniqueIndex::BookTitle),
                ],
            ),
            FieldRule::new("description", presence, vec![Constraint::String]),
            FieldRule::new("author", presence, bounded_string()),
            FieldRule::new("publisher", presence, bounded_string()),
            FieldRule::new(
                "date_of_issue",
                presence,
                vec![
                    Constraint::Date,
                    Constraint::DateFormat(DATE_OF_ISSUE_FORMAT),
                ],
            ),
        ])
    }

    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }

    /// 入力を検証する
    ///
    /// 一意性以外の制約をすべて評価する。一意性の判定が必要な値は
    /// `SchemaCheck::unique_candidates` で取り出し、呼び出し側が
    /// 結果を`reject_unique`で反映したうえで`finish`する。
    pub fn check(&self, input: &Map<String, Value>) -> SchemaCheck {
        let mut reports = Vec::with_capacity(self.rules.len());
        let mut validated = Map::new();

        for rule in &self.rules {
            let mut report = FieldReport {
                field: rule.field,
                messages: Vec::new(),
                unique_candidate: None,
            };

            let Some(value) = normalize(input.get(rule.field)) else {
                if rule.presence == Presence::Required {
                    report
                        .messages
                        .push(format!("The {} field is required.", attribute(rule.field)));
                }
                reports.push(report);
                continue;
            };

            for constraint in &rule.constraints {
                match constraint {
                    Constraint::String => {
                        if !value.is_string() {
                            report
                                .messages
                                .push(format!("The {} must be a string.", attribute(rule.field)));
                            // 文字列でなければ以降の制約は評価できない
                            break;
                        }
                    }
                    Constraint::MaxLength(max) => {
                        if let Some(s) = value.as_str() {
                            if s.chars().count() > *max {
                                report.messages.push(format!(
                                    "The {} must not be greater than {} characters.",
                                    attribute(rule.field),
                                    max
                                ));
                            }
                        }
                    }
                    Constraint::Date => {
                        if !value.as_str().is_some_and(is_valid_date) {
                            report.messages.push(format!(
                                "The {} is not a valid date.",
                                attribute(rule.field)
                            ));
                        }
                    }
                    Constraint::DateFormat(format) => {
                        let matches = value
                            .as_str()
                            .is_some_and(|s| matches_date_format(s, format));
                        if !matches {
                            report.messages.push(format!(
                                "The {} does not match the format {}.",
                                attribute(rule.field),
                                format.replace('%', "")
                            ));
                        }
                    }
                    Constraint::Unique(index) => {
                        if report.messages.is_empty() {
                            report.unique_candidate =
                                value.as_str().map(|s| (*index, s.to_owned()));
                        }
                    }
                }
            }

            if report.messages.is_empty() {
                validated.insert(rule.field.to_string(), value);
            }
            reports.push(report);
        }

        SchemaCheck { reports, validated }
    }
}

/// 1フィールドの検証結果
#[derive(Debug, Clone)]
struct FieldReport {
    field: &'static str,
    messages: Vec<String>,
    unique_candidate: Option<(UniqueIndex, String)>,
}

/// スキーマ評価の途中結果
#[derive(Debug, Clone)]
pub struct SchemaCheck {
    reports: Vec<FieldReport>,
    validated: Map<String, Value>,
}

impl SchemaCheck {
    /// 一意性の判定が必要な (フィールド, インデックス, 値) の一覧
    pub fn unique_candidates(&self) -> Vec<(&'static str, UniqueIndex, String)> {
        self.reports
            .iter()
            .filter_map(|r| {
                r.unique_candidate
                    .clone()
                    .map(|(index, value)| (r.field, index, value))
            })
            .collect()
    }

    /// 値が既に使われていたフィールドを違反として記録する
    pub fn reject_unique(&mut self, field: &str) {
        if let Some(report) = self.reports.iter_mut().find(|r| r.field == field) {
            report.unique_candidate = None;
            report.messages.push(already_taken_message(field));
            self.validated.remove(field);
        }
    }

    /// 検証を確定する
    ///
    /// 違反が1つでもあれば全フィールド分のエラーをまとめて返す。
    pub fn finish(self) -> Result<Map<String, Value>, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        for report in self.reports {
            for message in report.messages {
                errors.add(report.field, message);
            }
        }

        if errors.is_empty() {
            Ok(self.validated)
        } else {
            Err(errors)
        }
    }
}

/// 入力値を正規化する
///
/// 文字列は前後の空白を除去し、空文字列はnullと同様に未入力として扱う。
fn normalize(value: Option<&Value>) -> Option<Value> {
    match value? {
        Value::Null => None,
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(Value::String(trimmed.to_string()))
            }
        }
        other => Some(other.clone()),
    }
}

/// 一意性違反のメッセージ
///
/// 保存時に一意インデックスで検出した違反もこの文言で報告する。
pub fn already_taken_message(field: &str) -> String {
    format!("The {} has already been taken.", attribute(field))
}

/// 指定フォーマットに厳密に一致するか
///
/// chronoは桁数の足りない数値や符号付きの年も受け付けるため、
/// 解析した日付を同じフォーマットで書き戻して入力と一致することを確認する。
fn matches_date_format(s: &str, format: &str) -> bool {
    NaiveDate::parse_from_str(s, format)
        .is_ok_and(|date| date.format(format).to_string() == s)
}

/// メッセージ用のフィールド表示名
fn attribute(field: &str) -> String {
    field.replace('_', " ")
}

/// 日付として解釈できるか
///
/// フォーマット指定とは独立に、一般的な日付・日時表記を受け付ける。
fn is_valid_date(s: &str) -> bool {
    const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%d-%m-%Y", "%m/%d/%Y"];
    const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

    DATE_FORMATS
        .iter()
        .any(|f| NaiveDate::parse_from_str(s, f).is_ok())
        || DATETIME_FORMATS
            .iter()
            .any(|f| NaiveDateTime::parse_from_str(s, f).is_ok())
        || DateTime::parse_from_rfc3339(s).is_ok()
}

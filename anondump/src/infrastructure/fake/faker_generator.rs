// /////////////////////////////////////////////////////////////////////////////
// Anondump RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Faker Column Generator
//!
//! Locale-aware implementation of the
//! [`FakeColumnGenerator`](anondump_domain::FakeColumnGenerator) port,
//! backed by the `fake` crate for textual producers and chrono + rand for
//! temporal and numeric ones (which are locale-neutral).
//!
//! ## Method registry
//!
//! The capability set is a fixed table of method names, each with the
//! argument keywords it accepts and the storage class of its values.
//! Unknown methods default to `String` in `data_type()` but fail
//! `supports()`, so a strategy naming one is rejected at parse time.
//! Custom providers (see [`super::providers`]) are consulted first and may
//! shadow built-in methods.
//!
//! ## Locales
//!
//! The locale string selects the value distribution and never changes a
//! method's data type. Locales map onto the fake library's compiled-in set;
//! an unrecognized locale logs a warning and falls back to `en`.

use std::sync::Arc;

use anondump_domain::services::fake_generator::format_args;
use anondump_domain::{AnonymizerError, FakeArg, FakeArgs, FakeColumnGenerator, FakeDataType, FakeValue};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Utc};
use fake::faker::address::raw::{
    BuildingNumber, CityName, CountryCode, CountryName, PostCode, SecondaryAddress, StateName, StreetName, ZipCode,
};
use fake::faker::company::raw::{
    Bs, Buzzword, CatchPhrase, CompanyName, CompanySuffix, Industry, Profession,
};
use fake::faker::creditcard::raw::CreditCardNumber;
use fake::faker::currency::raw::{CurrencyCode, CurrencyName, CurrencySymbol};
use fake::faker::filesystem::raw::{FileExtension, FileName, FilePath, MimeType};
use fake::faker::internet::raw::{FreeEmail, IPv4, IPv6, Password, SafeEmail, UserAgent, Username};
use fake::faker::lorem::raw::{Paragraph, Sentence, Word};
use fake::faker::name::raw::{FirstName, LastName, Name, NameWithTitle};
use fake::faker::phone_number::raw::{CellNumber, PhoneNumber};
use fake::locales::{Data, AR_SA, EN, FR_FR, JA_JP, PT_BR, ZH_CN, ZH_TW};
use fake::Fake;
use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;
use std::collections::HashMap;
use tracing::warn;

use super::providers::{resolve_providers, FakeProvider};

/// Default value distribution when neither the strategy file nor the
/// environment selects one.
pub const DEFAULT_LOCALE: &str = "en_GB";

/// The locales the fake library compiles in.
///
/// `en_GB`, `en_US` and plain `en` all share the `EN` distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakeLocale {
    En,
    FrFr,
    PtBr,
    ZhCn,
    ZhTw,
    JaJp,
    ArSa,
}

impl FakeLocale {
    /// Parses a locale string, tolerating case and `-`/`_` separators.
    pub fn parse(locale: &str) -> Option<Self> {
        let normalized = locale.trim().replace('-', "_").to_ascii_lowercase();
        match normalized.as_str() {
            "en" | "en_gb" | "en_us" | "en_au" | "en_ca" => Some(FakeLocale::En),
            "fr" | "fr_fr" => Some(FakeLocale::FrFr),
            "pt_br" => Some(FakeLocale::PtBr),
            "zh_cn" => Some(FakeLocale::ZhCn),
            "zh_tw" => Some(FakeLocale::ZhTw),
            "ja" | "ja_jp" => Some(FakeLocale::JaJp),
            "ar" | "ar_sa" => Some(FakeLocale::ArSa),
            _ => None,
        }
    }
}

/// One entry of the built-in capability table.
struct MethodSpec {
    data_type: FakeDataType,
    accepted_args: &'static [&'static str],
}

macro_rules! method_table {
    ($( $name:literal => ($data_type:expr, $args:expr) ),* $(,)?) => {{
        let mut table: HashMap<&'static str, MethodSpec> = HashMap::new();
        $(
            table.insert($name, MethodSpec { data_type: $data_type, accepted_args: $args });
        )*
        table
    }};
}

const NO_ARGS: &[&str] = &[];

static METHODS: Lazy<HashMap<&'static str, MethodSpec>> = Lazy::new(|| {
    use FakeDataType::*;
    method_table! {
        // names
        "first_name" => (String, NO_ARGS),
        "last_name" => (String, NO_ARGS),
        "name" => (String, NO_ARGS),
        "name_with_title" => (String, NO_ARGS),
        "user_name" => (String, NO_ARGS),
        // internet
        "email" => (String, NO_ARGS),
        "free_email" => (String, NO_ARGS),
        "company_email" => (String, NO_ARGS),
        "password" => (String, &["length"]),
        "ipv4" => (String, NO_ARGS),
        "ipv6" => (String, NO_ARGS),
        "user_agent" => (String, NO_ARGS),
        "uuid4" => (String, NO_ARGS),
        // address
        "address" => (String, NO_ARGS),
        "street_address" => (String, NO_ARGS),
        "secondary_address" => (String, NO_ARGS),
        "street_name" => (String, NO_ARGS),
        "city" => (String, NO_ARGS),
        "state" => (String, NO_ARGS),
        "postcode" => (String, NO_ARGS),
        "zipcode" => (String, NO_ARGS),
        "country" => (String, NO_ARGS),
        "country_code" => (String, NO_ARGS),
        "building_number" => (String, NO_ARGS),
        // phone
        "phone_number" => (String, NO_ARGS),
        "cell_number" => (String, NO_ARGS),
        // company
        "company" => (String, NO_ARGS),
        "company_suffix" => (String, NO_ARGS),
        "job" => (String, NO_ARGS),
        "industry" => (String, NO_ARGS),
        "catch_phrase" => (String, NO_ARGS),
        "buzzword" => (String, NO_ARGS),
        "bs" => (String, NO_ARGS),
        // lorem
        "word" => (String, NO_ARGS),
        "sentence" => (String, &["nb_words"]),
        "paragraph" => (String, &["nb_sentences"]),
        "text" => (String, &["max_nb_chars"]),
        // finance / misc
        "credit_card_number" => (String, NO_ARGS),
        "currency_code" => (String, NO_ARGS),
        "currency_name" => (String, NO_ARGS),
        "currency_symbol" => (String, NO_ARGS),
        "file_name" => (String, NO_ARGS),
        "file_path" => (String, NO_ARGS),
        "file_extension" => (String, NO_ARGS),
        "mime_type" => (String, NO_ARGS),
        // numeric
        "random_int" => (Int, &["min", "max"]),
        "random_digit" => (Int, NO_ARGS),
        "unix_time" => (Int, NO_ARGS),
        // dates
        "date" => (Date, NO_ARGS),
        "date_object" => (Date, NO_ARGS),
        "date_of_birth" => (Date, &["minimum_age", "maximum_age"]),
        "date_between" => (Date, &["start_date", "end_date"]),
        "date_between_dates" => (Date, &["start_date", "end_date"]),
        "date_this_century" => (Date, NO_ARGS),
        "date_this_decade" => (Date, NO_ARGS),
        "date_this_year" => (Date, NO_ARGS),
        "date_this_month" => (Date, NO_ARGS),
        "past_date" => (Date, NO_ARGS),
        "future_date" => (Date, NO_ARGS),
        // datetimes
        "date_time" => (DateTime, NO_ARGS),
        "date_time_ad" => (DateTime, NO_ARGS),
        "date_time_between" => (DateTime, &["start_date", "end_date"]),
        "date_time_between_dates" => (DateTime, &["start_date", "end_date"]),
        "date_time_this_century" => (DateTime, NO_ARGS),
        "date_time_this_decade" => (DateTime, NO_ARGS),
        "date_time_this_year" => (DateTime, NO_ARGS),
        "date_time_this_month" => (DateTime, NO_ARGS),
        "past_datetime" => (DateTime, NO_ARGS),
        "future_datetime" => (DateTime, NO_ARGS),
    }
});

/// Locale-aware fake-value generator with custom-provider support.
pub struct FakerColumnGenerator {
    locale: FakeLocale,
    providers: Vec<Arc<dyn FakeProvider>>,
}

impl FakerColumnGenerator {
    /// Creates a generator for `locale`, registering the named custom
    /// providers before any capability check.
    ///
    /// # Errors
    ///
    /// Fails when a named provider is not registered.
    pub fn new(locale: &str, provider_names: &[String]) -> Result<Self, AnonymizerError> {
        let locale = FakeLocale::parse(locale).unwrap_or_else(|| {
            warn!("unrecognized locale `{}`, falling back to en", locale);
            FakeLocale::En
        });
        let providers = resolve_providers(provider_names)?;
        Ok(Self { locale, providers })
    }

    fn provider_for(&self, method: &str) -> Option<&Arc<dyn FakeProvider>> {
        self.providers
            .iter()
            .find(|provider| provider.methods().iter().any(|m| m == method))
    }

    fn int_value(&self, method: &str, args: &FakeArgs) -> Option<FakeValue> {
        let mut rng = rand::rng();
        match method {
            "random_int" => {
                let min = arg_i64(args, "min").unwrap_or(0);
                let max = arg_i64(args, "max").unwrap_or(9999);
                let (min, max) = if min <= max { (min, max) } else { (max, min) };
                Some(FakeValue::Int(rng.random_range(min..=max)))
            }
            "random_digit" => Some(FakeValue::Int(rng.random_range(0..=9))),
            "unix_time" => {
                let now = Utc::now().timestamp();
                Some(FakeValue::Int(rng.random_range(0..=now)))
            }
            _ => None,
        }
    }

    fn temporal_value(&self, method: &str, args: &FakeArgs) -> Result<Option<FakeValue>, AnonymizerError> {
        let today = Utc::now().date_naive();
        let now = Utc::now().naive_utc();

        let value = match method {
            "date" | "date_object" => FakeValue::Date(random_date(today - Duration::days(30 * 365), today)),
            "date_of_birth" => {
                let minimum_age = arg_i64(args, "minimum_age").unwrap_or(0);
                let maximum_age = arg_i64(args, "maximum_age").unwrap_or(115);
                let latest = today - Duration::days(minimum_age * 365);
                let earliest = today - Duration::days(maximum_age * 365 + 364);
                FakeValue::Date(random_date(earliest, latest))
            }
            "date_between" | "date_between_dates" => {
                let start = relative_date(args_str(args, "start_date").unwrap_or("-30y"), today)?;
                let end = relative_date(args_str(args, "end_date").unwrap_or("today"), today)?;
                FakeValue::Date(random_date(start, end))
            }
            "date_this_century" => {
                let century_start = NaiveDate::from_ymd_opt(today.year() - today.year() % 100, 1, 1)
                    .unwrap_or(today);
                FakeValue::Date(random_date(century_start, today))
            }
            "date_this_decade" => {
                let decade_start = NaiveDate::from_ymd_opt(today.year() - today.year() % 10, 1, 1)
                    .unwrap_or(today);
                FakeValue::Date(random_date(decade_start, today))
            }
            "date_this_year" => {
                let year_start = NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(today);
                FakeValue::Date(random_date(year_start, today))
            }
            "date_this_month" => {
                let month_start = NaiveDate::from_ymd_opt(today.year(), today.month(), 1).unwrap_or(today);
                FakeValue::Date(random_date(month_start, today))
            }
            "past_date" => FakeValue::Date(random_date(today - Duration::days(30), today - Duration::days(1))),
            "future_date" => FakeValue::Date(random_date(today + Duration::days(1), today + Duration::days(30))),
            "date_time" => FakeValue::DateTime(random_datetime(epoch(), now)),
            "date_time_ad" => {
                let ad_start = NaiveDate::from_ymd_opt(1, 1, 1)
                    .unwrap_or(today)
                    .and_hms_opt(0, 0, 0)
                    .unwrap_or(now);
                FakeValue::DateTime(random_datetime(ad_start, now))
            }
            "date_time_between" | "date_time_between_dates" => {
                let start = relative_date(args_str(args, "start_date").unwrap_or("-30y"), today)?;
                let end = relative_date(args_str(args, "end_date").unwrap_or("today"), today)?;
                FakeValue::DateTime(random_datetime(
                    start.and_hms_opt(0, 0, 0).unwrap_or(now),
                    end.and_hms_opt(23, 59, 59).unwrap_or(now),
                ))
            }
            "date_time_this_century" => {
                let century_start = NaiveDate::from_ymd_opt(now.year() - now.year() % 100, 1, 1)
                    .unwrap_or(today)
                    .and_hms_opt(0, 0, 0)
                    .unwrap_or(now);
                FakeValue::DateTime(random_datetime(century_start, now))
            }
            "date_time_this_decade" => {
                let decade_start = NaiveDate::from_ymd_opt(now.year() - now.year() % 10, 1, 1)
                    .unwrap_or(today)
                    .and_hms_opt(0, 0, 0)
                    .unwrap_or(now);
                FakeValue::DateTime(random_datetime(decade_start, now))
            }
            "date_time_this_year" => {
                let year_start = NaiveDate::from_ymd_opt(now.year(), 1, 1)
                    .unwrap_or(today)
                    .and_hms_opt(0, 0, 0)
                    .unwrap_or(now);
                FakeValue::DateTime(random_datetime(year_start, now))
            }
            "date_time_this_month" => {
                let month_start = NaiveDate::from_ymd_opt(now.year(), now.month(), 1)
                    .unwrap_or(today)
                    .and_hms_opt(0, 0, 0)
                    .unwrap_or(now);
                FakeValue::DateTime(random_datetime(month_start, now))
            }
            "past_datetime" => FakeValue::DateTime(random_datetime(now - Duration::days(30), now)),
            "future_datetime" => FakeValue::DateTime(random_datetime(now, now + Duration::days(30))),
            _ => return Ok(None),
        };

        Ok(Some(value))
    }

    fn string_value(&self, method: &str, args: &FakeArgs) -> Option<FakeValue> {
        let value = match self.locale {
            FakeLocale::En => localized_string(EN, method, args),
            FakeLocale::FrFr => localized_string(FR_FR, method, args),
            FakeLocale::PtBr => localized_string(PT_BR, method, args),
            FakeLocale::ZhCn => localized_string(ZH_CN, method, args),
            FakeLocale::ZhTw => localized_string(ZH_TW, method, args),
            FakeLocale::JaJp => localized_string(JA_JP, method, args),
            FakeLocale::ArSa => localized_string(AR_SA, method, args),
        };
        value.map(FakeValue::String)
    }
}

impl FakeColumnGenerator for FakerColumnGenerator {
    fn supports(&self, method: &str) -> bool {
        self.provider_for(method).is_some() || METHODS.contains_key(method)
    }

    fn supports_args(&self, method: &str, args: &FakeArgs) -> bool {
        if let Some(provider) = self.provider_for(method) {
            return provider.accepts(method, args);
        }
        match METHODS.get(method) {
            Some(spec) => args.keys().all(|key| spec.accepted_args.contains(&key.as_str())),
            None => false,
        }
    }

    fn data_type(&self, method: &str) -> FakeDataType {
        if let Some(provider) = self.provider_for(method) {
            return provider.data_type(method);
        }
        METHODS
            .get(method)
            .map(|spec| spec.data_type)
            .unwrap_or(FakeDataType::String)
    }

    fn value(&self, method: &str, args: &FakeArgs) -> Result<FakeValue, AnonymizerError> {
        if let Some(provider) = self.provider_for(method) {
            if !provider.accepts(method, args) {
                return Err(AnonymizerError::UnsupportedFakeArguments {
                    method: method.to_string(),
                    arguments: format_args(args),
                });
            }
            return provider.value(method, args);
        }

        if !METHODS.contains_key(method) {
            return Err(AnonymizerError::UnsupportedFakeType(method.to_string()));
        }
        if !self.supports_args(method, args) {
            return Err(AnonymizerError::UnsupportedFakeArguments {
                method: method.to_string(),
                arguments: format_args(args),
            });
        }

        if let Some(value) = self.int_value(method, args) {
            return Ok(value);
        }
        if let Some(value) = self.temporal_value(method, args)? {
            return Ok(value);
        }
        if let Some(value) = self.string_value(method, args) {
            return Ok(value);
        }

        // A method listed in METHODS but produced by none of the arms is a
        // table/dispatch mismatch.
        Err(AnonymizerError::internal_error(format!(
            "fake method `{}` is registered but has no producer",
            method
        )))
    }
}

/// Textual producers, generic over the fake library's locale data.
fn localized_string<L: Data + Copy>(locale: L, method: &str, args: &FakeArgs) -> Option<String> {
    let value = match method {
        "first_name" => FirstName(locale).fake::<String>(),
        "last_name" => LastName(locale).fake::<String>(),
        "name" => Name(locale).fake::<String>(),
        "name_with_title" => NameWithTitle(locale).fake::<String>(),
        "user_name" => Username(locale).fake::<String>(),
        "email" => SafeEmail(locale).fake::<String>(),
        "free_email" => FreeEmail(locale).fake::<String>(),
        "company_email" => {
            let user: String = Username(locale).fake();
            let company: String = CompanyName(locale).fake();
            let mut domain: String = company
                .chars()
                .filter(|c| c.is_ascii_alphanumeric())
                .collect::<String>()
                .to_ascii_lowercase();
            if domain.is_empty() {
                domain = "example".to_string();
            }
            format!("{}@{}.com", user, domain)
        }
        "password" => {
            let length = arg_i64(args, "length").unwrap_or(12).clamp(1, 128) as usize;
            Password(locale, length..length + 1).fake::<String>()
        }
        "ipv4" => IPv4(locale).fake::<String>(),
        "ipv6" => IPv6(locale).fake::<String>(),
        "user_agent" => UserAgent(locale).fake::<String>(),
        "uuid4" => uuid::Uuid::new_v4().to_string(),
        "address" => {
            let number: String = BuildingNumber(locale).fake();
            let street: String = StreetName(locale).fake();
            let city: String = CityName(locale).fake();
            let postcode: String = PostCode(locale).fake();
            format!("{} {}, {}, {}", number, street, city, postcode)
        }
        "street_address" => {
            let number: String = BuildingNumber(locale).fake();
            let street: String = StreetName(locale).fake();
            format!("{} {}", number, street)
        }
        "secondary_address" => SecondaryAddress(locale).fake::<String>(),
        "street_name" => StreetName(locale).fake::<String>(),
        "city" => CityName(locale).fake::<String>(),
        "state" => StateName(locale).fake::<String>(),
        "postcode" => PostCode(locale).fake::<String>(),
        "zipcode" => ZipCode(locale).fake::<String>(),
        "country" => CountryName(locale).fake::<String>(),
        "country_code" => CountryCode(locale).fake::<String>(),
        "building_number" => BuildingNumber(locale).fake::<String>(),
        "phone_number" => PhoneNumber(locale).fake::<String>(),
        "cell_number" => CellNumber(locale).fake::<String>(),
        "company" => CompanyName(locale).fake::<String>(),
        "company_suffix" => CompanySuffix(locale).fake::<String>(),
        "job" => Profession(locale).fake::<String>(),
        "industry" => Industry(locale).fake::<String>(),
        "catch_phrase" => CatchPhrase(locale).fake::<String>(),
        "buzzword" => Buzzword(locale).fake::<String>(),
        "bs" => Bs(locale).fake::<String>(),
        "word" => Word(locale).fake::<String>(),
        "sentence" => {
            let words = arg_i64(args, "nb_words").unwrap_or(6).clamp(1, 100) as usize;
            Sentence(locale, words..words + 1).fake::<String>()
        }
        "paragraph" => {
            let sentences = arg_i64(args, "nb_sentences").unwrap_or(3).clamp(1, 50) as usize;
            Paragraph(locale, sentences..sentences + 1).fake::<String>()
        }
        "text" => {
            let max_chars = arg_i64(args, "max_nb_chars").unwrap_or(200).clamp(1, 100_000) as usize;
            let text: String = Paragraph(locale, 3..8).fake();
            text.chars().take(max_chars).collect()
        }
        "credit_card_number" => CreditCardNumber(locale).fake::<String>(),
        "currency_code" => CurrencyCode(locale).fake::<String>(),
        "currency_name" => CurrencyName(locale).fake::<String>(),
        "currency_symbol" => CurrencySymbol(locale).fake::<String>(),
        "file_name" => FileName(locale).fake::<String>(),
        "file_path" => FilePath(locale).fake::<String>(),
        "file_extension" => FileExtension(locale).fake::<String>(),
        "mime_type" => MimeType(locale).fake::<String>(),
        _ => return None,
    };
    Some(value)
}

fn arg_i64(args: &FakeArgs, key: &str) -> Option<i64> {
    match args.get(key) {
        Some(FakeArg::Int(i)) => Some(*i),
        Some(FakeArg::Float(f)) => Some(*f as i64),
        Some(FakeArg::Str(s)) => s.parse().ok(),
        _ => None,
    }
}

fn args_str<'a>(args: &'a FakeArgs, key: &str) -> Option<&'a str> {
    match args.get(key) {
        Some(FakeArg::Str(s)) => Some(s.as_str()),
        _ => None,
    }
}

fn epoch() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1970, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .expect("epoch is a valid datetime")
}

fn random_date(earliest: NaiveDate, latest: NaiveDate) -> NaiveDate {
    if earliest >= latest {
        return latest;
    }
    let span = (latest - earliest).num_days();
    earliest + Duration::days(rand::rng().random_range(0..=span))
}

fn random_datetime(earliest: NaiveDateTime, latest: NaiveDateTime) -> NaiveDateTime {
    if earliest >= latest {
        return latest;
    }
    let span = (latest - earliest).num_seconds();
    earliest + Duration::seconds(rand::rng().random_range(0..=span))
}

static RELATIVE_DATE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([+-]?\d+)([dwmy])$").expect("relative date pattern is valid"));

/// Parses the relative-date mini-language used by `date_between`-style
/// arguments: `today`, `now`, or `<signed count><d|w|m|y>` (e.g. `-30y`).
fn relative_date(spec: &str, today: NaiveDate) -> Result<NaiveDate, AnonymizerError> {
    let trimmed = spec.trim();
    if trimmed.eq_ignore_ascii_case("today") || trimmed.eq_ignore_ascii_case("now") {
        return Ok(today);
    }

    let captures = RELATIVE_DATE_PATTERN.captures(trimmed).ok_or_else(|| {
        AnonymizerError::config_syntax(format!("unrecognized relative date `{}`", spec))
    })?;
    let count: i64 = captures[1]
        .parse()
        .map_err(|_| AnonymizerError::config_syntax(format!("unrecognized relative date `{}`", spec)))?;
    let days = match &captures[2] {
        "d" => count,
        "w" => count * 7,
        "m" => count * 30,
        "y" => count * 365,
        _ => unreachable!("pattern restricts the unit"),
    };

    Ok(today + Duration::days(days))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator() -> FakerColumnGenerator {
        FakerColumnGenerator::new(DEFAULT_LOCALE, &[]).unwrap()
    }

    #[test]
    fn test_supports_known_methods() {
        let generator = generator();
        assert!(generator.supports("first_name"));
        assert!(generator.supports("random_int"));
        assert!(generator.supports("date_of_birth"));
        assert!(!generator.supports("quantum_flux"));
    }

    #[test]
    fn test_supports_args_checks_keywords() {
        let generator = generator();

        let mut good = FakeArgs::new();
        good.insert("min".to_string(), FakeArg::Int(1));
        good.insert("max".to_string(), FakeArg::Int(10));
        assert!(generator.supports_args("random_int", &good));

        let mut bad = FakeArgs::new();
        bad.insert("step".to_string(), FakeArg::Int(2));
        assert!(!generator.supports_args("random_int", &bad));

        let mut not_argless = FakeArgs::new();
        not_argless.insert("length".to_string(), FakeArg::Int(2));
        assert!(!generator.supports_args("first_name", &not_argless));
    }

    #[test]
    fn test_data_types_match_table() {
        let generator = generator();
        assert_eq!(generator.data_type("first_name"), FakeDataType::String);
        assert_eq!(generator.data_type("random_int"), FakeDataType::Int);
        assert_eq!(generator.data_type("date_of_birth"), FakeDataType::Date);
        assert_eq!(generator.data_type("date_time_this_year"), FakeDataType::DateTime);
        // unknowns default to STRING
        assert_eq!(generator.data_type("quantum_flux"), FakeDataType::String);
    }

    #[test]
    fn test_value_for_unknown_method_fails() {
        let err = generator().value("quantum_flux", &FakeArgs::new()).unwrap_err();
        assert!(matches!(err, AnonymizerError::UnsupportedFakeType(_)));
    }

    #[test]
    fn test_value_for_bad_args_fails() {
        let mut args = FakeArgs::new();
        args.insert("step".to_string(), FakeArg::Int(2));
        let err = generator().value("random_int", &args).unwrap_err();
        assert!(matches!(err, AnonymizerError::UnsupportedFakeArguments { .. }));
    }

    #[test]
    fn test_random_int_respects_bounds() {
        let mut args = FakeArgs::new();
        args.insert("min".to_string(), FakeArg::Int(5));
        args.insert("max".to_string(), FakeArg::Int(7));

        let generator = generator();
        for _ in 0..50 {
            let FakeValue::Int(value) = generator.value("random_int", &args).unwrap() else {
                panic!("random_int must produce an int");
            };
            assert!((5..=7).contains(&value));
        }
    }

    #[test]
    fn test_string_method_produces_nonempty_string() {
        let FakeValue::String(value) = generator().value("first_name", &FakeArgs::new()).unwrap() else {
            panic!("first_name must produce a string");
        };
        assert!(!value.is_empty());
    }

    #[test]
    fn test_temporal_value_matches_declared_type() {
        let generator = generator();
        assert!(matches!(
            generator.value("date_of_birth", &FakeArgs::new()).unwrap(),
            FakeValue::Date(_)
        ));
        assert!(matches!(
            generator.value("past_datetime", &FakeArgs::new()).unwrap(),
            FakeValue::DateTime(_)
        ));
    }

    #[test]
    fn test_date_of_birth_age_window() {
        let mut args = FakeArgs::new();
        args.insert("minimum_age".to_string(), FakeArg::Int(18));
        args.insert("maximum_age".to_string(), FakeArg::Int(30));

        let generator = generator();
        let today = Utc::now().date_naive();
        for _ in 0..25 {
            let FakeValue::Date(dob) = generator.value("date_of_birth", &args).unwrap() else {
                panic!("date_of_birth must produce a date");
            };
            let age_days = (today - dob).num_days();
            assert!(age_days >= 18 * 365, "too young: {}", dob);
            assert!(age_days <= 31 * 365, "too old: {}", dob);
        }
    }

    #[test]
    fn test_relative_date_parsing() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        assert_eq!(relative_date("today", today).unwrap(), today);
        assert_eq!(
            relative_date("-1d", today).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 14).unwrap()
        );
        assert_eq!(
            relative_date("+2w", today).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 29).unwrap()
        );
        assert!(relative_date("next tuesday", today).is_err());
    }

    #[test]
    fn test_unknown_locale_falls_back_to_en() {
        let generator = FakerColumnGenerator::new("xx_XX", &[]).unwrap();
        assert!(generator.supports("first_name"));
    }

    #[test]
    fn test_locale_parse() {
        assert_eq!(FakeLocale::parse("en_GB"), Some(FakeLocale::En));
        assert_eq!(FakeLocale::parse("fr-FR"), Some(FakeLocale::FrFr));
        assert_eq!(FakeLocale::parse("JA_JP"), Some(FakeLocale::JaJp));
        assert_eq!(FakeLocale::parse("tlh"), None);
    }
}

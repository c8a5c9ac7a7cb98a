//! Postal addresses
//!
//! [`AddressForm`] is what the customer typed and is kept as-is so nothing
//! they entered is lost. [`AddressForm::validate`] turns it into a normalized
//! [`Address`] or a [`ValidationError`] listing every failing field.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::validation::{AddressField, Field, FieldError, ValidationError};

/// Countries the store ships to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Country {
    /// United States
    Us,
    /// Canada
    Ca,
    /// United Kingdom
    Gb,
    /// Australia
    Au,
    /// Germany
    De,
    /// France
    Fr,
    /// Netherlands
    Nl,
    /// Japan
    Jp,
}

impl Country {
    /// Every supported country.
    pub const ALL: [Self; 8] = [
        Self::Us,
        Self::Ca,
        Self::Gb,
        Self::Au,
        Self::De,
        Self::Fr,
        Self::Nl,
        Self::Jp,
    ];

    /// ISO 3166-1 alpha-2 code.
    pub fn code(self) -> &'static str {
        match self {
            Self::Us => "US",
            Self::Ca => "CA",
            Self::Gb => "GB",
            Self::Au => "AU",
            Self::De => "DE",
            Self::Fr => "FR",
            Self::Nl => "NL",
            Self::Jp => "JP",
        }
    }

    /// English display name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Us => "United States",
            Self::Ca => "Canada",
            Self::Gb => "United Kingdom",
            Self::Au => "Australia",
            Self::De => "Germany",
            Self::Fr => "France",
            Self::Nl => "Netherlands",
            Self::Jp => "Japan",
        }
    }

    /// Subdivision codes accepted for the state field. Empty when the
    /// country does not use one.
    pub fn regions(self) -> &'static [&'static str] {
        match self {
            Self::Us => US_STATES,
            Self::Ca => CA_PROVINCES,
            Self::Au => AU_STATES,
            Self::Gb | Self::De | Self::Fr | Self::Nl | Self::Jp => &[],
        }
    }

    /// Whether the state field is required.
    pub fn requires_region(self) -> bool {
        !self.regions().is_empty()
    }

    /// Label of the state field on the form.
    pub fn region_label(self) -> &'static str {
        match self {
            Self::Us => "State",
            Self::Ca => "Province",
            Self::Au => "State or territory",
            Self::Gb => "County",
            Self::De | Self::Fr | Self::Nl | Self::Jp => "Region",
        }
    }

    /// Label of the postal code field on the form.
    pub fn postal_label(self) -> &'static str {
        match self {
            Self::Us => "ZIP code",
            Self::Gb => "Postcode",
            Self::Ca | Self::Au | Self::De | Self::Fr | Self::Nl | Self::Jp => "Postal code",
        }
    }

    /// Validate and normalize a postal code for this country.
    ///
    /// Returns `None` when the code does not match the country's format.
    pub fn normalize_postal_code(self, raw: &str) -> Option<String> {
        let compact: String = raw
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_uppercase();

        if !compact.is_ascii() {
            return None;
        }

        match self {
            Self::Us => us_zip(&compact),
            Self::Ca => ca_postal(&compact),
            Self::Gb => gb_postcode(&compact),
            Self::Au => digits_exact(&compact, 4),
            Self::De | Self::Fr => digits_exact(&compact, 5),
            Self::Nl => nl_postcode(&compact),
            Self::Jp => jp_postal(&compact),
        }
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Error parsing a country code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("we don't ship to {0}")]
pub struct UnsupportedCountry(pub String);

impl FromStr for Country {
    type Err = UnsupportedCountry;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_uppercase();

        Self::ALL
            .into_iter()
            .find(|country| {
                country.code() == code || country.name().eq_ignore_ascii_case(s.trim())
            })
            .ok_or_else(|| UnsupportedCountry(s.trim().to_string()))
    }
}

impl TryFrom<String> for Country {
    type Error = UnsupportedCountry;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Country> for String {
    fn from(value: Country) -> Self {
        value.code().to_string()
    }
}

/// Raw address form input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AddressForm {
    /// Recipient name
    pub full_name: String,
    /// First street line
    pub line1: String,
    /// Second street line (optional)
    pub line2: String,
    /// City or town
    pub city: String,
    /// State, province or territory
    pub state: String,
    /// Postal or ZIP code
    pub postal_code: String,
    /// ISO country code
    pub country: String,
    /// Contact phone (optional)
    pub phone: String,
}

impl AddressForm {
    /// Validate every field and build a normalized address.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] with one entry per failing field, scoped
    /// to [`Field::Shipping`]. Use [`ValidationError::as_billing`] for billing forms.
    pub fn validate(&self) -> Result<Address, ValidationError> {
        let mut errors = ValidationError::new();

        let full_name = errors.check(required(AddressField::FullName, &self.full_name, "Name"));
        let line1 = errors.check(required(AddressField::Line1, &self.line1, "Address"));
        let city = errors.check(required(AddressField::City, &self.city, "City"));

        let country = errors.check(parse_country(&self.country));

        let (state, postal_code) = match country {
            Some(country) => (
                errors.check(validate_region(country, &self.state)),
                errors.check(validate_postal_code(country, &self.postal_code)),
            ),
            None => (None, None),
        };

        let phone = errors.check(validate_phone(&self.phone));

        match (full_name, line1, city, country, state, postal_code, phone) {
            (
                Some(full_name),
                Some(line1),
                Some(city),
                Some(country),
                Some(state),
                Some(postal_code),
                Some(phone),
            ) if errors.is_empty() => Ok(Address {
                full_name,
                line1,
                line2: non_empty(&self.line2),
                city,
                state,
                postal_code,
                country,
                phone,
            }),
            _ => Err(errors),
        }
    }
}

impl From<&Address> for AddressForm {
    fn from(address: &Address) -> Self {
        Self {
            full_name: address.full_name.clone(),
            line1: address.line1.clone(),
            line2: address.line2.clone().unwrap_or_default(),
            city: address.city.clone(),
            state: address.state.clone().unwrap_or_default(),
            postal_code: address.postal_code.clone(),
            country: address.country.code().to_string(),
            phone: address.phone.clone().unwrap_or_default(),
        }
    }
}

/// A validated, normalized postal address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    /// Recipient name
    pub full_name: String,
    /// First street line
    pub line1: String,
    /// Second street line
    pub line2: Option<String>,
    /// City or town
    pub city: String,
    /// Upper-cased subdivision code, when the country uses one
    pub state: Option<String>,
    /// Normalized postal code
    pub postal_code: String,
    /// Destination country
    pub country: Country,
    /// Contact phone
    pub phone: Option<String>,
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.full_name)?;
        writeln!(f, "{}", self.line1)?;
        if let Some(line2) = &self.line2 {
            writeln!(f, "{line2}")?;
        }
        match &self.state {
            Some(state) => writeln!(f, "{}, {state} {}", self.city, self.postal_code)?,
            None => writeln!(f, "{} {}", self.postal_code, self.city)?,
        }
        write!(f, "{}", self.country.name())
    }
}

fn shipping(field: AddressField) -> Field {
    Field::Shipping(field)
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn required(field: AddressField, value: &str, label: &str) -> Result<String, FieldError> {
    let trimmed = value.trim();

    if trimmed.is_empty() {
        return Err(FieldError::new(shipping(field), format!("{label} is required")));
    }

    if trimmed.chars().count() > 100 {
        return Err(FieldError::new(
            shipping(field),
            format!("{label} must be at most 100 characters"),
        ));
    }

    Ok(trimmed.to_string())
}

fn parse_country(raw: &str) -> Result<Country, FieldError> {
    if raw.trim().is_empty() {
        return Err(FieldError::new(shipping(AddressField::Country), "Country is required"));
    }

    raw.parse().map_err(|error: UnsupportedCountry| {
        FieldError::new(shipping(AddressField::Country), format!("Sorry, {error}"))
    })
}

fn validate_region(country: Country, raw: &str) -> Result<Option<String>, FieldError> {
    let region = raw.trim().to_ascii_uppercase();

    if !country.requires_region() {
        return Ok(non_empty(raw));
    }

    if region.is_empty() {
        return Err(FieldError::new(
            shipping(AddressField::State),
            format!("{} is required", country.region_label()),
        ));
    }

    if !country.regions().contains(&region.as_str()) {
        return Err(FieldError::new(
            shipping(AddressField::State),
            format!(
                "Select a valid {} for {}",
                country.region_label().to_ascii_lowercase(),
                country.name()
            ),
        ));
    }

    Ok(Some(region))
}

fn validate_postal_code(country: Country, raw: &str) -> Result<String, FieldError> {
    if raw.trim().is_empty() {
        return Err(FieldError::new(
            shipping(AddressField::PostalCode),
            format!("{} is required", country.postal_label()),
        ));
    }

    country.normalize_postal_code(raw).ok_or_else(|| {
        FieldError::new(
            shipping(AddressField::PostalCode),
            format!(
                "Enter a valid {} for {}",
                country.postal_label().to_ascii_lowercase(),
                country.name()
            ),
        )
    })
}

fn validate_phone(raw: &str) -> Result<Option<String>, FieldError> {
    let Some(phone) = non_empty(raw) else {
        return Ok(None);
    };

    let digits = phone.chars().filter(char::is_ascii_digit).count();
    let allowed = phone
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | ' ' | '(' | ')' | '.'));

    if !allowed || !(7..=15).contains(&digits) {
        return Err(FieldError::new(
            shipping(AddressField::Phone),
            "Enter a valid phone number",
        ));
    }

    Ok(Some(phone))
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

fn digits_exact(compact: &str, len: usize) -> Option<String> {
    (compact.len() == len && is_digits(compact)).then(|| compact.to_string())
}

fn us_zip(compact: &str) -> Option<String> {
    match compact.split_once('-') {
        None => digits_exact(compact, 5),
        Some((zip, plus4)) => {
            let zip = digits_exact(zip, 5)?;
            let plus4 = digits_exact(plus4, 4)?;
            Some(format!("{zip}-{plus4}"))
        }
    }
}

fn ca_postal(compact: &str) -> Option<String> {
    let chars: Vec<char> = compact.chars().collect();

    let [a, b, c, d, e, f] = chars.as_slice() else {
        return None;
    };

    let letter = |ch: &char| {
        ch.is_ascii_alphabetic() && !matches!(ch, 'D' | 'F' | 'I' | 'O' | 'Q' | 'U')
    };
    let first_letter = letter(a) && !matches!(a, 'W' | 'Z');

    if first_letter
        && b.is_ascii_digit()
        && letter(c)
        && d.is_ascii_digit()
        && letter(e)
        && f.is_ascii_digit()
    {
        Some(format!("{a}{b}{c} {d}{e}{f}"))
    } else {
        None
    }
}

fn gb_postcode(compact: &str) -> Option<String> {
    if !(5..=7).contains(&compact.len()) || !compact.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }

    let split = compact.len().checked_sub(3)?;
    let (outward, inward) = compact.split_at_checked(split)?;

    let mut inward_chars = inward.chars();
    let inward_ok = matches!(
        (inward_chars.next(), inward_chars.next(), inward_chars.next()),
        (Some(d), Some(x), Some(y))
            if d.is_ascii_digit() && x.is_ascii_alphabetic() && y.is_ascii_alphabetic()
    );

    let outward_ok = outward
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic())
        && outward.chars().any(|c| c.is_ascii_digit());

    (inward_ok && outward_ok).then(|| format!("{outward} {inward}"))
}

fn nl_postcode(compact: &str) -> Option<String> {
    if compact.len() != 6 {
        return None;
    }

    let (digits, letters) = compact.split_at_checked(4)?;

    let ok = is_digits(digits)
        && !digits.starts_with('0')
        && letters.chars().all(|c| c.is_ascii_alphabetic());

    ok.then(|| format!("{digits} {letters}"))
}

fn jp_postal(compact: &str) -> Option<String> {
    let digits: String = compact.chars().filter(|c| *c != '-').collect();
    let dashes = compact.chars().filter(|c| *c == '-').count();

    if dashes > 1 || digits.len() != 7 || !is_digits(&digits) {
        return None;
    }

    let (head, tail) = digits.split_at_checked(3)?;

    Some(format!("{head}-{tail}"))
}

const US_STATES: &[&str] = &[
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "DC", "FL", "GA", "HI", "ID", "IL", "IN", "IA",
    "KS", "KY", "LA", "ME", "MD", "MA", "MI", "MN", "MS", "MO", "MT", "NE", "NV", "NH", "NJ", "NM",
    "NY", "NC", "ND", "OH", "OK", "OR", "PA", "RI", "SC", "SD", "TN", "TX", "UT", "VT", "VA", "WA",
    "WV", "WI", "WY", "AS", "GU", "MP", "PR", "VI", "AA", "AE", "AP",
];

const CA_PROVINCES: &[&str] = &[
    "AB", "BC", "MB", "NB", "NL", "NS", "NT", "NU", "ON", "PE", "QC", "SK", "YT",
];

const AU_STATES: &[&str] = &["ACT", "NSW", "NT", "QLD", "SA", "TAS", "VIC", "WA"];

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn form(country: &str, state: &str, postal_code: &str) -> AddressForm {
        AddressForm {
            full_name: "Jen Skywalker".to_string(),
            line1: "123 Valencia St".to_string(),
            line2: String::new(),
            city: "San Francisco".to_string(),
            state: state.to_string(),
            postal_code: postal_code.to_string(),
            country: country.to_string(),
            phone: String::new(),
        }
    }

    #[test]
    fn us_address_with_valid_zip_passes() -> TestResult {
        let address = form("US", "CA", "94110").validate()?;

        assert_eq!(address.country, Country::Us);
        assert_eq!(address.state.as_deref(), Some("CA"));
        assert_eq!(address.postal_code, "94110");

        Ok(())
    }

    #[test]
    fn us_address_with_letters_in_zip_fails_on_postal_code() {
        let result = form("US", "CA", "ABCDE").validate();

        let Err(errors) = result else {
            unreachable!("ABCDE is not a ZIP code");
        };

        assert_eq!(errors.errors().len(), 1);
        assert!(errors.has(Field::Shipping(AddressField::PostalCode)));
    }

    #[test]
    fn zip_plus_four_is_accepted() -> TestResult {
        let address = form("us", "ny", " 10001-1234 ").validate()?;

        assert_eq!(address.postal_code, "10001-1234");
        assert_eq!(address.state.as_deref(), Some("NY"));

        Ok(())
    }

    #[test]
    fn state_must_belong_to_country() {
        let result = form("US", "ON", "94110").validate();

        assert!(
            result
                .as_ref()
                .is_err_and(|errors| errors.has(Field::Shipping(AddressField::State))),
            "expected state error, got {result:?}"
        );
    }

    #[test]
    fn canadian_postal_code_is_normalized() -> TestResult {
        let address = form("CA", "on", "k1a0b1").validate()?;

        assert_eq!(address.postal_code, "K1A 0B1");
        assert_eq!(address.state.as_deref(), Some("ON"));

        Ok(())
    }

    #[test]
    fn canadian_postal_code_rejects_forbidden_letters() {
        assert_eq!(Country::Ca.normalize_postal_code("D1A 0B1"), None);
        assert_eq!(Country::Ca.normalize_postal_code("K1A 0O1"), None);
    }

    #[test]
    fn uk_postcode_without_state() -> TestResult {
        let address = form("GB", "", "sw1a1aa").validate()?;

        assert_eq!(address.postal_code, "SW1A 1AA");
        assert_eq!(address.state, None);

        Ok(())
    }

    #[test]
    fn other_postal_formats() {
        assert_eq!(Country::Au.normalize_postal_code("2000"), Some("2000".to_string()));
        assert_eq!(Country::De.normalize_postal_code("1011"), None);
        assert_eq!(Country::Nl.normalize_postal_code("1012ab"), Some("1012 AB".to_string()));
        assert_eq!(Country::Nl.normalize_postal_code("0123AB"), None);
        assert_eq!(Country::Jp.normalize_postal_code("1000001"), Some("100-0001".to_string()));
        assert_eq!(Country::Jp.normalize_postal_code("100-00-01"), None);
    }

    #[test]
    fn non_ascii_postal_codes_are_rejected() {
        for (country, state, postal_code) in [
            ("US", "CA", "9411é"),
            ("US", "CA", "94110-12é"),
            ("CA", "ON", "K1A 0É1"),
            ("GB", "", "SW1A 1Ä"),
            ("AU", "NSW", "20é"),
            ("DE", "", "1011é"),
            ("FR", "", "750é1"),
            ("NL", "", "123éA"),
            ("NL", "", "1012ÅB"),
            ("JP", "", "100-000é"),
        ] {
            let result = form(country, state, postal_code).validate();

            assert!(
                result
                    .as_ref()
                    .is_err_and(|errors| errors.has(Field::Shipping(AddressField::PostalCode))),
                "{country} {postal_code:?} should fail on the postal code, got {result:?}"
            );
        }
    }

    #[test]
    fn empty_form_reports_every_required_field() {
        let Err(errors) = AddressForm::default().validate() else {
            unreachable!("an empty form is never valid");
        };

        for field in [
            AddressField::FullName,
            AddressField::Line1,
            AddressField::City,
            AddressField::Country,
        ] {
            assert!(errors.has(Field::Shipping(field)), "missing error for {field:?}");
        }
    }

    #[test]
    fn unsupported_country_is_a_field_error() {
        let result = form("BR", "", "01310-100").validate();

        assert!(
            result
                .as_ref()
                .is_err_and(|errors| errors.has(Field::Shipping(AddressField::Country))),
            "expected country error, got {result:?}"
        );
    }

    #[test]
    fn phone_is_optional_but_checked_when_present() {
        let mut with_phone = form("US", "CA", "94110");
        with_phone.phone = "call me".to_string();

        assert!(with_phone.validate().is_err());

        with_phone.phone = "+1 (415) 555-0100".to_string();

        assert!(with_phone.validate().is_ok());
    }

    #[test]
    fn country_parses_codes_and_names() -> TestResult {
        assert_eq!("gb".parse::<Country>()?, Country::Gb);
        assert_eq!("Canada".parse::<Country>()?, Country::Ca);

        Ok(())
    }

    #[test]
    fn form_round_trips_from_address() -> TestResult {
        let address = form("US", "CA", "94110").validate()?;

        assert_eq!(AddressForm::from(&address).validate()?, address);

        Ok(())
    }
}

// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use serde::{Deserialize, Serialize};

/// A currency as shown in pickers and lists, and as stored in favorites.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurrencyRecord {
    pub code: String,
    pub name: String,
    pub symbol: String,
    pub flag: String,
}

impl CurrencyRecord {
    pub fn new(code: &str, name: &str, symbol: &str, flag: &str) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            symbol: symbol.to_string(),
            flag: flag.to_string(),
        }
    }
}

// (code, name, symbol, flag). The first two entries are the converter defaults.
const CATALOG: &[(&str, &str, &str, &str)] = &[
    ("USD", "US Dollar", "$", "🇺🇸"),
    ("EUR", "Euro", "€", "🇪🇺"),
    ("GBP", "British Pound", "£", "🇬🇧"),
    ("JPY", "Japanese Yen", "¥", "🇯🇵"),
    ("AUD", "Australian Dollar", "A$", "🇦🇺"),
    ("CAD", "Canadian Dollar", "C$", "🇨🇦"),
    ("CHF", "Swiss Franc", "CHF", "🇨🇭"),
    ("CNY", "Chinese Yuan", "¥", "🇨🇳"),
    ("INR", "Indian Rupee", "₹", "🇮🇳"),
    ("BRL", "Brazilian Real", "R$", "🇧🇷"),
    ("MXN", "Mexican Peso", "$", "🇲🇽"),
    ("KRW", "South Korean Won", "₩", "🇰🇷"),
    ("SEK", "Swedish Krona", "kr", "🇸🇪"),
    ("NZD", "New Zealand Dollar", "NZ$", "🇳🇿"),
    ("SGD", "Singapore Dollar", "S$", "🇸🇬"),
    ("HKD", "Hong Kong Dollar", "HK$", "🇭🇰"),
    ("NOK", "Norwegian Krone", "kr", "🇳🇴"),
    ("ZAR", "South African Rand", "R", "🇿🇦"),
    ("TRY", "Turkish Lira", "₺", "🇹🇷"),
    ("RUB", "Russian Ruble", "₽", "🇷🇺"),
];

/// All known currencies, in display order
pub fn catalog() -> Vec<CurrencyRecord> {
    CATALOG
        .iter()
        .map(|(code, name, symbol, flag)| CurrencyRecord::new(code, name, symbol, flag))
        .collect()
}

/// Look up a currency by its exact code
pub fn find_currency(code: &str) -> Option<CurrencyRecord> {
    CATALOG
        .iter()
        .find(|(c, ..)| *c == code)
        .map(|(code, name, symbol, flag)| CurrencyRecord::new(code, name, symbol, flag))
}

/// Default (from, to) pair for the converter.
pub fn default_pair() -> (CurrencyRecord, CurrencyRecord) {
    let (from, to) = (&CATALOG[0], &CATALOG[1]);
    (
        CurrencyRecord::new(from.0, from.1, from.2, from.3),
        CurrencyRecord::new(to.0, to.1, to.2, to.3),
    )
}

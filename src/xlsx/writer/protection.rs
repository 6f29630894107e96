//! Sheet protection.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt::Write as FmtWrite;

use crate::common::Result;

bitflags! {
    /// Actions a protected sheet still allows, plus the protected parts.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ProtectionFlags: u32 {
        const SHEET = 1 << 0;
        const CONTENT = 1 << 1;
        const OBJECTS = 1 << 2;
        const SCENARIOS = 1 << 3;
        const FORMAT_CELLS = 1 << 4;
        const FORMAT_COLUMNS = 1 << 5;
        const FORMAT_ROWS = 1 << 6;
        const INSERT_COLUMNS = 1 << 7;
        const INSERT_ROWS = 1 << 8;
        const INSERT_HYPERLINKS = 1 << 9;
        const DELETE_COLUMNS = 1 << 10;
        const DELETE_ROWS = 1 << 11;
        const SELECT_LOCKED_CELLS = 1 << 12;
        const SORT = 1 << 13;
        const AUTOFILTER = 1 << 14;
        const PIVOT_TABLES = 1 << 15;
        const SELECT_UNLOCKED_CELLS = 1 << 16;
    }
}

/// Options for `protect()`. Each flag set to `true` allows the action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProtectionOptions {
    pub sheet: bool,
    pub content: bool,
    pub objects: bool,
    pub scenarios: bool,
    pub format_cells: bool,
    pub format_columns: bool,
    pub format_rows: bool,
    pub insert_columns: bool,
    pub insert_rows: bool,
    pub insert_hyperlinks: bool,
    pub delete_columns: bool,
    pub delete_rows: bool,
    pub select_locked_cells: bool,
    pub sort: bool,
    pub autofilter: bool,
    pub pivot_tables: bool,
    pub select_unlocked_cells: bool,
}

impl Default for ProtectionOptions {
    fn default() -> Self {
        Self {
            sheet: true,
            content: false,
            objects: false,
            scenarios: false,
            format_cells: false,
            format_columns: false,
            format_rows: false,
            insert_columns: false,
            insert_rows: false,
            insert_hyperlinks: false,
            delete_columns: false,
            delete_rows: false,
            select_locked_cells: true,
            sort: false,
            autofilter: false,
            pivot_tables: false,
            select_unlocked_cells: true,
        }
    }
}

impl From<&ProtectionOptions> for ProtectionFlags {
    fn from(o: &ProtectionOptions) -> Self {
        let mut flags = ProtectionFlags::empty();
        for (on, flag) in [
            (o.sheet, Self::SHEET),
            (o.content, Self::CONTENT),
            (o.objects, Self::OBJECTS),
            (o.scenarios, Self::SCENARIOS),
            (o.format_cells, Self::FORMAT_CELLS),
            (o.format_columns, Self::FORMAT_COLUMNS),
            (o.format_rows, Self::FORMAT_ROWS),
            (o.insert_columns, Self::INSERT_COLUMNS),
            (o.insert_rows, Self::INSERT_ROWS),
            (o.insert_hyperlinks, Self::INSERT_HYPERLINKS),
            (o.delete_columns, Self::DELETE_COLUMNS),
            (o.delete_rows, Self::DELETE_ROWS),
            (o.select_locked_cells, Self::SELECT_LOCKED_CELLS),
            (o.sort, Self::SORT),
            (o.autofilter, Self::AUTOFILTER),
            (o.pivot_tables, Self::PIVOT_TABLES),
            (o.select_unlocked_cells, Self::SELECT_UNLOCKED_CELLS),
        ] {
            flags.set(flag, on);
        }
        flags
    }
}

/// Legacy 16-bit password hash stored in `sheetProtection`.
///
/// # Examples
///
/// ```
/// use litchi_xlsxwriter::xlsx::writer::protection::encode_password;
/// assert_eq!(encode_password("password"), 0x83AF);
/// ```
pub fn encode_password(password: &str) -> u16 {
    let mut hash: u64 = 0;
    let mut count = 0u64;
    for (i, c) in password.chars().enumerate() {
        let shifted = (c as u64).checked_shl(i as u32 + 1).unwrap_or(0);
        let low_15 = shifted & 0x7fff;
        let high_15 = (shifted & (0x7fff << 15)) >> 15;
        hash ^= low_15 | high_15;
        count += 1;
    }
    hash ^= count;
    hash ^= 0xCE4B;
    hash as u16
}

/// Protection state of a sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetProtection {
    pub flags: ProtectionFlags,
    pub password_hash: Option<u16>,
}

impl SheetProtection {
    pub fn new(password: Option<&str>, options: &ProtectionOptions) -> Self {
        Self {
            flags: options.into(),
            password_hash: password.filter(|p| !p.is_empty()).map(encode_password),
        }
    }

    /// Write `<sheetProtection>`.
    pub fn write_xml(&self, xml: &mut String) -> Result<()> {
        let f = self.flags;
        xml.push_str("<sheetProtection");
        if let Some(hash) = self.password_hash {
            write!(xml, r#" password="{:X}""#, hash)?;
        }
        let attrs: [(&str, bool, &str); 17] = [
            ("sheet", f.contains(ProtectionFlags::SHEET), "1"),
            ("content", f.contains(ProtectionFlags::CONTENT), "1"),
            ("objects", !f.contains(ProtectionFlags::OBJECTS), "1"),
            ("scenarios", !f.contains(ProtectionFlags::SCENARIOS), "1"),
            ("formatCells", f.contains(ProtectionFlags::FORMAT_CELLS), "0"),
            ("formatColumns", f.contains(ProtectionFlags::FORMAT_COLUMNS), "0"),
            ("formatRows", f.contains(ProtectionFlags::FORMAT_ROWS), "0"),
            ("insertColumns", f.contains(ProtectionFlags::INSERT_COLUMNS), "0"),
            ("insertRows", f.contains(ProtectionFlags::INSERT_ROWS), "0"),
            ("insertHyperlinks", f.contains(ProtectionFlags::INSERT_HYPERLINKS), "0"),
            ("deleteColumns", f.contains(ProtectionFlags::DELETE_COLUMNS), "0"),
            ("deleteRows", f.contains(ProtectionFlags::DELETE_ROWS), "0"),
            ("selectLockedCells", !f.contains(ProtectionFlags::SELECT_LOCKED_CELLS), "1"),
            ("sort", f.contains(ProtectionFlags::SORT), "0"),
            ("autoFilter", f.contains(ProtectionFlags::AUTOFILTER), "0"),
            ("pivotTables", f.contains(ProtectionFlags::PIVOT_TABLES), "0"),
            ("selectUnlockedCells", !f.contains(ProtectionFlags::SELECT_UNLOCKED_CELLS), "1"),
        ];
        for (name, present, value) in attrs {
            if present {
                write!(xml, r#" {}="{}""#, name, value)?;
            }
        }
        xml.push_str("/>");
        Ok(())
    }
}

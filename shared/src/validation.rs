//! Validation utilities for the Fabrication ERP
//!
//! Includes India-specific validations (GSTIN, mobile numbers, PIN codes).

use rust_decimal::Decimal;

// ============================================================================
// General Validations
// ============================================================================

/// Validate email format (basic check)
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if email.contains('@') && email.contains('.') && email.len() >= 5 {
        Ok(())
    } else {
        Err("Invalid email format")
    }
}

/// Validate branch code format (2-10 uppercase alphanumeric)
pub fn validate_branch_code(code: &str) -> Result<(), &'static str> {
    if code.len() < 2 {
        return Err("Branch code must be at least 2 characters");
    }
    if code.len() > 10 {
        return Err("Branch code must be at most 10 characters");
    }
    if !code.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()) {
        return Err("Branch code must be uppercase alphanumeric only");
    }
    Ok(())
}

/// Validate password strength
pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.len() < 8 {
        return Err("Password must be at least 8 characters");
    }
    Ok(())
}

/// Validate a money amount is non-negative with at most 2 decimal places
pub fn validate_money(amount: Decimal) -> Result<(), &'static str> {
    if amount < Decimal::ZERO {
        return Err("Amount cannot be negative");
    }
    if amount.normalize().scale() > 2 {
        return Err("Amount can have at most 2 decimal places");
    }
    Ok(())
}

// ============================================================================
// India-Specific Validations
// ============================================================================

/// Validate Indian mobile number
/// Accepts: 9876543210, 98765-43210, +919876543210, 09876543210
pub fn validate_indian_phone(phone: &str) -> Result<(), &'static str> {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();

    let local = match digits.len() {
        10 => digits.as_str(),
        11 if digits.starts_with('0') => &digits[1..],
        12 if digits.starts_with("91") => &digits[2..],
        _ => return Err("Invalid Indian phone number format"),
    };

    // Mobile numbers start with 6-9
    match local.chars().next() {
        Some('6'..='9') => Ok(()),
        _ => Err("Invalid Indian phone number format"),
    }
}

/// Validate 6-digit Indian postal PIN code
pub fn validate_pin_code(pin: &str) -> Result<(), &'static str> {
    if pin.len() != 6 || !pin.chars().all(|c| c.is_ascii_digit()) || pin.starts_with('0') {
        return Err("PIN code must be 6 digits and cannot start with 0");
    }
    Ok(())
}

const GSTIN_CHARSET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Validate a 15-character GSTIN including its mod-36 check character.
///
/// Layout: 2-digit state code, 10-character PAN, entity number, `Z`,
/// check character.
pub fn validate_gstin(gstin: &str) -> Result<(), &'static str> {
    let bytes = gstin.as_bytes();
    if bytes.len() != 15 {
        return Err("GSTIN must be 15 characters");
    }
    if !bytes.iter().all(|b| GSTIN_CHARSET.contains(b)) {
        return Err("GSTIN must be uppercase alphanumeric");
    }

    let state: u32 = gstin[..2].parse().map_err(|_| "GSTIN must start with a state code")?;
    if !(1..=38).contains(&state) && state != 97 && state != 99 {
        return Err("GSTIN has an invalid state code");
    }
    if bytes[13] != b'Z' {
        return Err("GSTIN 14th character must be Z");
    }

    let mut sum = 0u32;
    for (i, b) in bytes[..14].iter().enumerate() {
        let value = GSTIN_CHARSET
            .iter()
            .position(|c| c == b)
            .ok_or("GSTIN must be uppercase alphanumeric")? as u32;
        let factor = if i % 2 == 0 { 1 } else { 2 };
        let product = value * factor;
        sum += product / 36 + product % 36;
    }
    let check = (36 - sum % 36) % 36;
    if GSTIN_CHARSET[check as usize] != bytes[14] {
        return Err("Invalid GSTIN checksum");
    }
    Ok(())
}

/// Whether two GSTINs are registered in different states (IGST applies)
pub fn is_interstate_supply(seller_gstin: &str, buyer_gstin: &str) -> bool {
    seller_gstin.get(..2) != buyer_gstin.get(..2)
}

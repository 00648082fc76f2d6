use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

// Every error is scoped to one source line, the pass carries on after recording it
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Symbol '{name}' already defined in line #{line} (Value: {value}, ${value:06x}, %{value:032b}).")]
    Redefinition { name: String, line: usize, value: u64 },

    #[error("Found extra parameters: {0}")]
    ExtraParameters(String),

    #[error("Expected , but found {0}.")]
    ExpectedComma(String),

    #[error("Missing {0}.")]
    MissingOperand(&'static str),

    #[error("Expected immediate #n but found '{0}'.")]
    ExpectedImmediate(String),

    #[error("Immediate not allowed here: '{0}'.")]
    UnexpectedImmediate(String),

    #[error("Immediate #n not in 0-{max} ({value})")]
    IndexRange { max: u8, value: u64 },

    #[error("Invalid pointer parameter: {0}")]
    InvalidPointer(String),

    #[error("Extraneous conditional '{0}'.")]
    MultipleConditionals(String),

    #[error("Conditional '{0}' not allowed before a directive.")]
    ConditionalDirective(String),

    #[error("Reserved word '{0}' used as parameter.")]
    ReservedWord(String),

    #[error("Unexpected flag update '{found}' not {expected}")]
    UnexpectedFlag { found: String, expected: &'static str },

    #[error("Missing flag update, expected {0}")]
    MissingFlag(&'static str),

    #[error("Not an instruction token '{0}'.")]
    NotAnInstruction(String),

    #[error("Constant '{0}' used as an instruction.")]
    ConstantAsInstruction(String),

    #[error("Extraneous MODCZ parameter '{0}'.")]
    ModczParam(String),

    #[error("Expected MODCZ param or immediate but found '{0}'.")]
    InvalidModcz(String),

    #[error("Expected MODCZ immediate in range 0…15 ({0}).")]
    ModczRange(u64),

    #[error("Division by zero.")]
    DivisionByZero,

    #[error("Unexpected '{0}' in expression.")]
    InvalidExpression(String),

    #[error("Invalid octal digit '{0}'.")]
    InvalidOctalDigit(char),

    #[error("Pointer index ${0:08x} is invalid.")]
    PointerIndex(u32),

    #[error("{field} value ${value:x} is > $1ff")]
    FieldOverflow { field: &'static str, value: u64 },

    #[error("Address ${0:x} exceeds 20 bits.")]
    AddressRange(u64),

    #[error("Code does not fit below ${limit:x} (ORG is ${org:x})")]
    FitExceeded { limit: u64, org: u64 },

    #[error("COG origin (${0:x}) exceeds limit")]
    OriginExceeded(u64),

    #[error("HUB address exceeds limit ${0:x}.")]
    HubExceeded(u64),

    #[error("Could not read source: {0}")]
    Io(String),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error::Io(err.to_string())
    }
}


#[cfg(test)]
mod error_tests {
    use super::*;

    #[test]
    fn test_redefinition_message() {
        let err = Error::Redefinition { name: "foo".to_string(), line: 3, value: 0x10 };
        assert_eq!(
            err.to_string(),
            "Symbol 'foo' already defined in line #3 (Value: 16, $000010, %00000000000000000000000000010000)."
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(Error::ExtraParameters("y".to_string()).to_string(), "Found extra parameters: y");
        assert_eq!(
            Error::UnexpectedFlag { found: "ANDC".to_string(), expected: "WC, WZ, or WCZ" }.to_string(),
            "Unexpected flag update 'ANDC' not WC, WZ, or WCZ"
        );
        assert_eq!(
            Error::FitExceeded { limit: 0x10, org: 0x12 }.to_string(),
            "Code does not fit below $10 (ORG is $12)"
        );
        assert_eq!(Error::PointerIndex(0xffffffef).to_string(), "Pointer index $ffffffef is invalid.");
        assert_eq!(Error::InvalidOctalDigit('9').to_string(), "Invalid octal digit '9'.");
    }
}

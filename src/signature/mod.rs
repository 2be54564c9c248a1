//! Parsing for JVM field/method descriptors and generic signatures.
//!
//! The rest of this crate treats descriptor and signature grammars as a leaf dependency (the
//! reference collector only needs [`FindReferencedClassNames`] to extract class names it
//! depends on). This module is that dependency's one concrete implementation: a small
//! recursive-descent parser over the descriptor grammar (JVMS §4.3) extended to the full
//! generic-signature grammar (JVMS §4.7.9.1), since a plain descriptor is a strict subset of a
//! signature's grammar.

use std::fmt;

/// A failure to parse a descriptor or generic-signature string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The string was empty where a type was expected.
    #[error("expected a type, found end of input")]
    UnexpectedEnd,
    /// An unrecognized character appeared where a type's leading byte was expected.
    #[error("unexpected character {0:?} in descriptor/signature")]
    UnexpectedChar(char),
    /// A class type was not terminated with `;`.
    #[error("unterminated class type signature")]
    UnterminatedClassType,
    /// Trailing characters remained after a complete type was parsed.
    #[error("trailing characters after type: {0:?}")]
    TrailingInput(String),
}

/// A primitive JVM type, as it appears in a field descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveType {
    /// `B`
    Byte,
    /// `C`
    Char,
    /// `D`
    Double,
    /// `F`
    Float,
    /// `I`
    Int,
    /// `J`
    Long,
    /// `S`
    Short,
    /// `Z`
    Boolean,
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            Self::Byte => 'B',
            Self::Char => 'C',
            Self::Double => 'D',
            Self::Float => 'F',
            Self::Int => 'I',
            Self::Long => 'J',
            Self::Short => 'S',
            Self::Boolean => 'Z',
        };
        f.write_char(c)
    }
}

/// A class type appearing within a signature, e.g. `List<String>.Entry`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassTypeSignature {
    /// The binary name of the outermost class, dot-separated (e.g. `java.util.List`).
    pub class_name: String,
    /// Type arguments applied directly to `class_name`, if any were written.
    pub type_arguments: Vec<TypeArgument>,
    /// Suffix path for a qualified inner-class signature (`Outer<T>.Inner<U>`), innermost last.
    pub inner_classes: Vec<(String, Vec<TypeArgument>)>,
}

/// A single type argument inside `< ... >`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeArgument {
    /// An unbounded wildcard, `*`.
    Wildcard,
    /// `T`, an invariant argument.
    Exact(Box<TypeSignature>),
    /// `+T`, an upper-bounded (`extends`) argument.
    Extends(Box<TypeSignature>),
    /// `-T`, a lower-bounded (`super`) argument.
    Super(Box<TypeSignature>),
}

/// A fully parsed JVM type signature (a generic-aware superset of a field descriptor).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeSignature {
    /// A primitive type.
    Primitive(PrimitiveType),
    /// A class or interface type, possibly generic.
    Class(ClassTypeSignature),
    /// An array type; `dimensions` counts the leading `[` characters.
    Array {
        /// Number of `[` dimensions.
        dimensions: u8,
        /// The element type.
        element: Box<TypeSignature>,
    },
    /// A formal type-parameter reference, e.g. `T`.
    TypeVariable(String),
}

/// A bound on a method's `throws` clause: either a class type or a type variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThrowsSignature {
    /// `^LSomeException;`
    Class(ClassTypeSignature),
    /// `^TE;`
    TypeVariable(String),
}

/// A formal type parameter declaration, e.g. `T:Ljava/lang/Object;`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormalTypeParameter {
    /// The parameter's name.
    pub name: String,
    /// The class bound, if any (`None` only when an interface bound is present without one).
    pub class_bound: Option<TypeSignature>,
    /// Interface bounds.
    pub interface_bounds: Vec<TypeSignature>,
}

/// A fully parsed JVM method signature (generic-aware method descriptor).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodTypeSignature {
    /// Formal type parameters declared by this method, if generic.
    pub type_parameters: Vec<FormalTypeParameter>,
    /// Parameter types, in order.
    pub parameters: Vec<TypeSignature>,
    /// The return type, or `None` for `void`.
    pub return_type: Option<TypeSignature>,
    /// Declared checked-exception bounds.
    pub throws: Vec<ThrowsSignature>,
}

/// Extracts the set of binary class names a parsed signature depends on.
///
/// This is the only operation [`crate::references`] actually needs from this module; it exists
/// as a trait (rather than a free function per type) because the external contract this module
/// fulfills is shaped that way (see `SPEC_FULL.md` §6/§10.5).
pub trait FindReferencedClassNames {
    /// Appends every class name this signature mentions to `out`.
    fn find_referenced_class_names(&self, out: &mut Vec<String>);
}

impl FindReferencedClassNames for ClassTypeSignature {
    fn find_referenced_class_names(&self, out: &mut Vec<String>) {
        out.push(self.class_name.clone());
        for arg in &self.type_arguments {
            arg.find_referenced_class_names(out);
        }
        for (name, args) in &self.inner_classes {
            out.push(format!("{}.{name}", self.class_name));
            for arg in args {
                arg.find_referenced_class_names(out);
            }
        }
    }
}

impl FindReferencedClassNames for TypeArgument {
    fn find_referenced_class_names(&self, out: &mut Vec<String>) {
        match self {
            Self::Wildcard => {}
            Self::Exact(t) | Self::Extends(t) | Self::Super(t) => {
                t.find_referenced_class_names(out);
            }
        }
    }
}

impl FindReferencedClassNames for TypeSignature {
    fn find_referenced_class_names(&self, out: &mut Vec<String>) {
        match self {
            Self::Primitive(_) | Self::TypeVariable(_) => {}
            Self::Class(c) => c.find_referenced_class_names(out),
            Self::Array { element, .. } => element.find_referenced_class_names(out),
        }
    }
}

impl FindReferencedClassNames for MethodTypeSignature {
    fn find_referenced_class_names(&self, out: &mut Vec<String>) {
        for tp in &self.type_parameters {
            if let Some(bound) = &tp.class_bound {
                bound.find_referenced_class_names(out);
            }
            for bound in &tp.interface_bounds {
                bound.find_referenced_class_names(out);
            }
        }
        for p in &self.parameters {
            p.find_referenced_class_names(out);
        }
        if let Some(r) = &self.return_type {
            r.find_referenced_class_names(out);
        }
        for t in &self.throws {
            match t {
                ThrowsSignature::Class(c) => c.find_referenced_class_names(out),
                ThrowsSignature::TypeVariable(_) => {}
            }
        }
    }
}

/// A cursor over a descriptor/signature string's `char`s, the unit JVMS grammars are defined in.
struct Cursor<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
}

impl<'a> Cursor<'a> {
    fn new(s: &'a str) -> Self {
        Self { chars: s.chars().peekable() }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn next(&mut self) -> Option<char> {
        self.chars.next()
    }

    fn expect(&mut self, expected: char) -> Result<(), ParseError> {
        match self.next() {
            Some(c) if c == expected => Ok(()),
            Some(c) => Err(ParseError::UnexpectedChar(c)),
            None => Err(ParseError::UnexpectedEnd),
        }
    }
}

fn parse_primitive(c: char) -> Option<PrimitiveType> {
    Some(match c {
        'B' => PrimitiveType::Byte,
        'C' => PrimitiveType::Char,
        'D' => PrimitiveType::Double,
        'F' => PrimitiveType::Float,
        'I' => PrimitiveType::Int,
        'J' => PrimitiveType::Long,
        'S' => PrimitiveType::Short,
        'Z' => PrimitiveType::Boolean,
        _ => return None,
    })
}

fn parse_type(cursor: &mut Cursor<'_>) -> Result<TypeSignature, ParseError> {
    match cursor.peek().ok_or(ParseError::UnexpectedEnd)? {
        '[' => {
            let mut dimensions = 0u8;
            while cursor.peek() == Some('[') {
                cursor.next();
                dimensions += 1;
            }
            let element = parse_type(cursor)?;
            Ok(TypeSignature::Array { dimensions, element: Box::new(element) })
        }
        'L' => {
            cursor.next();
            Ok(TypeSignature::Class(parse_class_type_body(cursor)?))
        }
        'T' => {
            cursor.next();
            let mut name = String::new();
            loop {
                match cursor.next() {
                    Some(';') => break,
                    Some(c) => name.push(c),
                    None => return Err(ParseError::UnexpectedEnd),
                }
            }
            Ok(TypeSignature::TypeVariable(name))
        }
        c => {
            cursor.next();
            parse_primitive(c)
                .map(TypeSignature::Primitive)
                .ok_or(ParseError::UnexpectedChar(c))
        }
    }
}

/// Parses the body of a class type signature after the leading `L` has been consumed.
fn parse_class_type_body(cursor: &mut Cursor<'_>) -> Result<ClassTypeSignature, ParseError> {
    let mut name = String::new();
    let type_arguments;
    loop {
        match cursor.peek().ok_or(ParseError::UnexpectedEnd)? {
            '/' => {
                cursor.next();
                name.push('.');
            }
            ';' => {
                cursor.next();
                type_arguments = Vec::new();
                return Ok(ClassTypeSignature { class_name: name, type_arguments, inner_classes: Vec::new() });
            }
            '<' => {
                cursor.next();
                type_arguments = parse_type_arguments(cursor)?;
                break;
            }
            _ => name.push(cursor.next().expect("peeked")),
        }
    }
    let mut inner_classes = Vec::new();
    loop {
        match cursor.peek().ok_or(ParseError::UnexpectedEnd)? {
            ';' => {
                cursor.next();
                return Ok(ClassTypeSignature { class_name: name, type_arguments, inner_classes });
            }
            '.' => {
                cursor.next();
                let mut inner_name = String::new();
                loop {
                    match cursor.peek().ok_or(ParseError::UnexpectedEnd)? {
                        ';' | '.' | '<' => break,
                        _ => inner_name.push(cursor.next().expect("peeked")),
                    }
                }
                let args = if cursor.peek() == Some('<') {
                    cursor.next();
                    parse_type_arguments(cursor)?
                } else {
                    Vec::new()
                };
                inner_classes.push((inner_name, args));
            }
            c => return Err(ParseError::UnexpectedChar(c)),
        }
    }
}

fn parse_type_arguments(cursor: &mut Cursor<'_>) -> Result<Vec<TypeArgument>, ParseError> {
    let mut args = Vec::new();
    loop {
        match cursor.peek().ok_or(ParseError::UnexpectedEnd)? {
            '>' => {
                cursor.next();
                return Ok(args);
            }
            '*' => {
                cursor.next();
                args.push(TypeArgument::Wildcard);
            }
            '+' => {
                cursor.next();
                args.push(TypeArgument::Extends(Box::new(parse_type(cursor)?)));
            }
            '-' => {
                cursor.next();
                args.push(TypeArgument::Super(Box::new(parse_type(cursor)?)));
            }
            _ => args.push(TypeArgument::Exact(Box::new(parse_type(cursor)?))),
        }
    }
}

fn parse_formal_type_parameters(cursor: &mut Cursor<'_>) -> Result<Vec<FormalTypeParameter>, ParseError> {
    if cursor.peek() != Some('<') {
        return Ok(Vec::new());
    }
    cursor.next();
    let mut params = Vec::new();
    loop {
        if cursor.peek() == Some('>') {
            cursor.next();
            return Ok(params);
        }
        let mut name = String::new();
        loop {
            match cursor.peek().ok_or(ParseError::UnexpectedEnd)? {
                ':' => {
                    cursor.next();
                    break;
                }
                _ => name.push(cursor.next().expect("peeked")),
            }
        }
        let class_bound = if cursor.peek() == Some(':') {
            None
        } else {
            Some(parse_type(cursor)?)
        };
        let mut interface_bounds = Vec::new();
        while cursor.peek() == Some(':') {
            cursor.next();
            interface_bounds.push(parse_type(cursor)?);
        }
        params.push(FormalTypeParameter { name, class_bound, interface_bounds });
    }
}

impl TypeSignature {
    /// Parses a plain field descriptor or a generic field-type signature.
    pub fn parse(s: &str) -> Result<Self, ParseError> {
        let mut cursor = Cursor::new(s);
        let result = parse_type(&mut cursor)?;
        if let Some(c) = cursor.peek() {
            return Err(ParseError::TrailingInput(std::iter::once(c).collect()));
        }
        Ok(result)
    }
}

impl MethodTypeSignature {
    /// Parses a plain method descriptor or a full generic method signature.
    pub fn parse(s: &str) -> Result<Self, ParseError> {
        let mut cursor = Cursor::new(s);
        let type_parameters = parse_formal_type_parameters(&mut cursor)?;
        cursor.expect('(')?;
        let mut parameters = Vec::new();
        while cursor.peek() != Some(')') {
            parameters.push(parse_type(&mut cursor)?);
        }
        cursor.expect(')')?;
        let return_type = if cursor.peek() == Some('V') {
            cursor.next();
            None
        } else {
            Some(parse_type(&mut cursor)?)
        };
        let mut throws = Vec::new();
        while cursor.peek() == Some('^') {
            cursor.next();
            match cursor.peek().ok_or(ParseError::UnexpectedEnd)? {
                'T' => {
                    cursor.next();
                    let mut name = String::new();
                    loop {
                        match cursor.next() {
                            Some(';') => break,
                            Some(c) => name.push(c),
                            None => return Err(ParseError::UnexpectedEnd),
                        }
                    }
                    throws.push(ThrowsSignature::TypeVariable(name));
                }
                'L' => {
                    cursor.next();
                    throws.push(ThrowsSignature::Class(parse_class_type_body(&mut cursor)?));
                }
                c => return Err(ParseError::UnexpectedChar(c)),
            }
        }
        if let Some(c) = cursor.peek() {
            return Err(ParseError::TrailingInput(std::iter::once(c).collect()));
        }
        Ok(Self { type_parameters, parameters, return_type, throws })
    }
}

//! Reads instances of the following line-based format:
//!
//! ```text
//! % Comments start with a percent sign.
//! var x 0..9
//! var y -3..3
//! soft x == 5
//! soft 10: x + 2*y <= 4
//! hard y != 0
//! ```
//!
//! A `soft` constraint may be preceded by a weight and a colon; unweighted constraints weigh 1.
//! Both sides of a constraint are sums of terms `a*x`, `x` and `a`.
use mussel_solver::containers::HashMap;
use mussel_solver::model::Comparator;
use mussel_solver::model::LinearConstraint;
use mussel_solver::model::Model;
use mussel_solver::model::VariableId;
use mussel_solver::ConstraintId;
use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::bytes::complete::take_till;
use nom::bytes::complete::take_till1;
use nom::character::complete::alpha1;
use nom::character::complete::alphanumeric1;
use nom::character::complete::digit1;
use nom::character::complete::space0;
use nom::character::complete::space1;
use nom::combinator::all_consuming;
use nom::combinator::cut;
use nom::combinator::map;
use nom::combinator::map_res;
use nom::combinator::opt;
use nom::combinator::recognize;
use nom::combinator::value;
use nom::error::ErrorKind;
use nom::multi::many0;
use nom::multi::many0_count;
use nom::sequence::delimited;
use nom::sequence::pair;
use nom::sequence::preceded;
use nom::sequence::separated_pair;
use nom::sequence::terminated;
use nom::IResult;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("line {line}: {kind}")]
pub(crate) struct ParseError {
    pub(crate) line: usize,
    pub(crate) kind: ParseErrorKind,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum ParseErrorKind {
    #[error("unknown statement '{0}', expected 'var', 'soft' or 'hard'")]
    UnknownStatement(String),
    #[error("'{0}' is not a valid variable name")]
    InvalidName(String),
    #[error("the variable '{0}' is declared twice")]
    DuplicateVariable(String),
    #[error("use of undeclared variable '{0}'")]
    UndeclaredVariable(String),
    #[error("the domain '{0}' is not of the form 'lower..upper'")]
    InvalidDomain(String),
    #[error("the domain of '{0}' is empty")]
    EmptyDomain(String),
    #[error("'{0}' is not a valid weight")]
    InvalidWeight(String),
    #[error("the constraint '{0}' does not contain a comparator")]
    MissingComparator(String),
    #[error("the term '{0}' is not of the form 'a*x', 'x' or 'a'")]
    InvalidTerm(String),
    #[error("the numbers of '{0}' do not fit in 64 bits")]
    IntegerOverflow(String),
}

/// A parsed instance: the model together with the soft and hard constraints which were posted
/// into it.
#[derive(Debug)]
pub(crate) struct Instance {
    pub(crate) model: Model,
    pub(crate) soft: Vec<ConstraintId>,
    /// The weight of every soft constraint, [`None`] if no weight was given at all.
    pub(crate) weights: Option<Vec<u64>>,
    pub(crate) hard: Vec<ConstraintId>,
}

pub(crate) fn parse_instance(source: &str) -> Result<Instance, ParseError> {
    let mut parser = InstanceParser::default();

    for (index, line) in source.lines().enumerate() {
        parser
            .parse_line(line)
            .map_err(|kind| ParseError {
                line: index + 1,
                kind,
            })?;
    }

    Ok(parser.finish())
}

#[derive(Debug, Default)]
struct InstanceParser {
    model: Model,
    variables: HashMap<String, VariableId>,
    soft: Vec<ConstraintId>,
    weights: Vec<u64>,
    is_weighted: bool,
    hard: Vec<ConstraintId>,
}

impl InstanceParser {
    fn parse_line(&mut self, line: &str) -> Result<(), ParseErrorKind> {
        let statement = line.split('%').next().unwrap_or_default().trim();
        if statement.is_empty() {
            return Ok(());
        }

        let (rest, keyword) = terminated(word, space0)(statement)
            .map_err(|_| ParseErrorKind::UnknownStatement(statement.to_owned()))?;
        match keyword {
            "var" => self.parse_variable(rest),
            "soft" => {
                let (expression, weight) = weight_prefix(rest)
                    .map_err(|_| ParseErrorKind::InvalidWeight(rest.to_owned()))?;
                let weight = match weight {
                    Some(weight) => {
                        self.is_weighted = true;
                        all_consuming(weight_value)(weight)
                            .map(|(_, weight)| weight)
                            .map_err(|_| ParseErrorKind::InvalidWeight(weight.trim().to_owned()))?
                    }
                    None => 1,
                };
                let constraint = self.parse_constraint(expression.trim())?;
                self.soft.push(self.model.add_constraint(constraint));
                self.weights.push(weight);
                Ok(())
            }
            "hard" => {
                let constraint = self.parse_constraint(rest)?;
                self.hard.push(self.model.add_constraint(constraint));
                Ok(())
            }
            _ => Err(ParseErrorKind::UnknownStatement(keyword.to_owned())),
        }
    }

    fn parse_variable(&mut self, declaration: &str) -> Result<(), ParseErrorKind> {
        let (domain, name) = terminated(word, space1)(declaration)
            .map_err(|_| ParseErrorKind::InvalidDomain(declaration.to_owned()))?;
        if all_consuming(identifier)(name).is_err() {
            return Err(ParseErrorKind::InvalidName(name.to_owned()));
        }
        if self.variables.contains_key(name) {
            return Err(ParseErrorKind::DuplicateVariable(name.to_owned()));
        }

        let (_, (lower_bound, upper_bound)) = all_consuming(domain_bounds)(domain)
            .map_err(|_| ParseErrorKind::InvalidDomain(domain.to_owned()))?;
        if lower_bound > upper_bound {
            return Err(ParseErrorKind::EmptyDomain(name.to_owned()));
        }

        let variable = self.model.new_variable(name, lower_bound, upper_bound);
        let _ = self.variables.insert(name.to_owned(), variable);
        Ok(())
    }

    /// Parses `lhs ? rhs` into `lhs - rhs ? 0`, with the constants moved to the right-hand side.
    fn parse_constraint(&self, expression: &str) -> Result<LinearConstraint, ParseErrorKind> {
        let (rest, lhs) = sum(expression).map_err(term_error)?;
        let (rest, comparator) = preceded(space0, comparator)(rest)
            .map_err(|_| ParseErrorKind::MissingComparator(expression.to_owned()))?;
        let (_, rhs) = all_consuming(terminated(sum, space0))(rest).map_err(term_error)?;

        let overflow = || ParseErrorKind::IntegerOverflow(expression.to_owned());
        let mut terms = vec![];
        let mut constant = 0_i64;
        let lhs = lhs.into_iter().map(|term| (1, term));
        let rhs = rhs.into_iter().map(|term| (-1, term));
        for (side, term) in lhs.chain(rhs) {
            match term {
                Term::Variable(coefficient, name) => {
                    let variable = self
                        .variables
                        .get(&name)
                        .copied()
                        .ok_or(ParseErrorKind::UndeclaredVariable(name))?;
                    terms.push((side * coefficient, variable));
                }
                Term::Constant(value) => {
                    constant = constant.checked_sub(side * value).ok_or_else(overflow)?;
                }
            }
        }

        LinearConstraint::new(terms, comparator, constant).map_err(|_| overflow())
    }

    fn finish(self) -> Instance {
        Instance {
            model: self.model,
            soft: self.soft,
            weights: self.is_weighted.then_some(self.weights),
            hard: self.hard,
        }
    }
}

/// Maps a failure to parse a sum of terms to the offending input.
fn term_error(error: nom::Err<nom::error::Error<&str>>) -> ParseErrorKind {
    match error {
        nom::Err::Error(error) | nom::Err::Failure(error) if error.code == ErrorKind::MapRes => {
            ParseErrorKind::IntegerOverflow(error.input.trim().to_owned())
        }
        nom::Err::Error(error) | nom::Err::Failure(error) => {
            ParseErrorKind::InvalidTerm(error.input.trim().to_owned())
        }
        nom::Err::Incomplete(_) => ParseErrorKind::InvalidTerm(String::new()),
    }
}

/// A non-empty run of characters up to the next whitespace.
fn word(input: &str) -> IResult<&str, &str> {
    take_till1(char::is_whitespace)(input)
}

/// `[<weight>:]`, yielding the text in front of the colon.
fn weight_prefix(input: &str) -> IResult<&str, Option<&str>> {
    opt(terminated(take_till(|character| character == ':'), tag(":")))(input)
}

fn weight_value(input: &str) -> IResult<&str, u64> {
    delimited(space0, nom::character::complete::u64, space0)(input)
}

/// `<lower bound>..<upper bound>`
fn domain_bounds(input: &str) -> IResult<&str, (i64, i64)> {
    separated_pair(
        delimited(space0, nom::character::complete::i64, space0),
        tag(".."),
        delimited(space0, nom::character::complete::i64, space0),
    )(input)
}

/// The comparators, with the two-character symbols before their one-character prefixes.
fn comparator(input: &str) -> IResult<&str, Comparator> {
    alt((
        value(Comparator::Equal, tag("==")),
        value(Comparator::NotEqual, tag("!=")),
        value(Comparator::LessOrEqual, tag("<=")),
        value(Comparator::GreaterOrEqual, tag(">=")),
        value(Comparator::Less, tag("<")),
        value(Comparator::Greater, tag(">")),
    ))(input)
}

/// `[+|-] <term> ((+|-) <term>)*`, with the signs applied to the terms.
fn sum(input: &str) -> IResult<&str, Vec<Term>> {
    map(
        pair(
            pair(
                preceded(space0, map(opt(sign), |sign| sign.unwrap_or(1))),
                preceded(space0, term),
            ),
            many0(pair(
                preceded(space0, sign),
                cut(preceded(space0, term)),
            )),
        ),
        |(first, rest)| {
            std::iter::once(first)
                .chain(rest)
                .map(|(sign, term)| term.signed(sign))
                .collect()
        },
    )(input)
}

fn sign(input: &str) -> IResult<&str, i64> {
    alt((value(1, tag("+")), value(-1, tag("-"))))(input)
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Term {
    Variable(i64, String),
    Constant(i64),
}

impl Term {
    /// The coefficient and the constant are non-negative before the sign is applied.
    fn signed(self, sign: i64) -> Term {
        match self {
            Term::Variable(coefficient, name) => Term::Variable(sign * coefficient, name),
            Term::Constant(value) => Term::Constant(sign * value),
        }
    }
}

/// `a*x`, `x` or `a`, where `a` is unsigned.
fn term(input: &str) -> IResult<&str, Term> {
    alt((
        map(
            separated_pair(magnitude, delimited(space0, tag("*"), space0), identifier),
            |(coefficient, name)| Term::Variable(coefficient, name.to_owned()),
        ),
        map(identifier, |name| Term::Variable(1, name.to_owned())),
        map(magnitude, Term::Constant),
    ))(input)
}

/// An unsigned integer which fits in an [`i64`].
fn magnitude(input: &str) -> IResult<&str, i64> {
    map_res(digit1, str::parse::<i64>)(input)
}

/// `[A-Za-z_][A-Za-z0-9_]*`
fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0_count(alt((alphanumeric1, tag("_")))),
    ))(input)
}

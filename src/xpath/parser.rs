//! Selector Parser
//!
//! Recursive descent parser for the constrained path selector subset:
//! absolute and relative location paths over the child, descendant, self,
//! parent and attribute axes, with positional, attribute and child-value
//! predicates.

use super::lexer::{Lexer, Token};
use crate::dom::node::split_qualified;
use crate::error::{Result, ValueError};

/// Compiled selector
#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    source: String,
    absolute: bool,
    steps: Vec<Step>,
}

/// Location step in a path
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub axis: Axis,
    pub test: NodeTest,
    pub predicates: Vec<Predicate>,
}

/// Supported axes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Child,
    Descendant,
    DescendantOrSelf,
    SelfNode,
    Parent,
    Attribute,
}

impl Axis {
    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "child" => Some(Axis::Child),
            "descendant" => Some(Axis::Descendant),
            "descendant-or-self" => Some(Axis::DescendantOrSelf),
            "self" => Some(Axis::SelfNode),
            "parent" => Some(Axis::Parent),
            "attribute" => Some(Axis::Attribute),
            _ => None,
        }
    }
}

/// Node test in a location step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeTest {
    /// `local` or `prefix:local`
    Name { prefix: Option<String>, local: String },
    /// `*` or `prefix:*`
    Wildcard { prefix: Option<String> },
    /// node() - matches any node
    Node,
    /// text() - matches text nodes
    Text,
    /// comment() - matches comments
    Comment,
}

impl NodeTest {
    fn prefix(&self) -> Option<&str> {
        match self {
            NodeTest::Name { prefix, .. } | NodeTest::Wildcard { prefix } => prefix.as_deref(),
            _ => None,
        }
    }
}

/// Step predicate
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `[n]`, 1-based
    Position(usize),
    /// `[@name]` or `[@name='value']`
    Attribute { test: NodeTest, value: Option<String> },
    /// `[name]` or `[name='value']`
    Child { test: NodeTest, value: Option<String> },
}

impl Selector {
    /// Parse a selector
    pub fn parse(source: &str) -> Result<Selector> {
        let mut parser = Parser::new(source);
        parser.parse().map_err(|reason| ValueError::malformed_query(source, reason))
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether evaluation starts at the document node rather than the root element
    pub fn is_absolute(&self) -> bool {
        self.absolute
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Every namespace prefix the selector's name tests use
    pub fn prefixes(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().flat_map(|step| {
            step.test.prefix().into_iter().chain(step.predicates.iter().filter_map(|p| match p {
                Predicate::Attribute { test, .. } | Predicate::Child { test, .. } => test.prefix(),
                Predicate::Position(_) => None,
            }))
        })
    }
}

/// Selector parser
pub struct Parser<'a> {
    source: &'a str,
    lexer: Lexer<'a>,
    current: Token,
}

impl<'a> Parser<'a> {
    /// Create a new parser
    pub fn new(input: &'a str) -> Self {
        let mut lexer = Lexer::new(input);
        let current = lexer.next_token();
        Parser {
            source: input,
            lexer,
            current,
        }
    }

    /// Parse the whole input as one selector
    pub fn parse(&mut self) -> std::result::Result<Selector, String> {
        let mut steps = Vec::new();
        let absolute = match self.current {
            Token::Slash => {
                self.advance();
                if matches!(self.current, Token::Eof) {
                    // Just /
                    return Ok(self.finish(true, steps));
                }
                true
            }
            Token::DoubleSlash => {
                self.advance();
                steps.push(descendant_or_self());
                true
            }
            Token::Eof => return Err("empty selector".to_string()),
            _ => false,
        };

        steps.push(self.parse_step()?);

        // Handle path continuation (e.g., /root/child/grandchild)
        loop {
            match self.current {
                Token::Slash => {
                    self.advance();
                    steps.push(self.parse_step()?);
                }
                Token::DoubleSlash => {
                    self.advance();
                    steps.push(descendant_or_self());
                    steps.push(self.parse_step()?);
                }
                Token::Eof => break,
                ref other => return Err(format!("unexpected {}", describe(other))),
            }
        }

        Ok(self.finish(absolute, steps))
    }

    fn finish(&self, absolute: bool, steps: Vec<Step>) -> Selector {
        Selector {
            source: self.source.to_string(),
            absolute,
            steps,
        }
    }

    /// Advance to next token
    fn advance(&mut self) {
        self.current = self.lexer.next_token();
    }

    fn expect(&mut self, token: Token) -> std::result::Result<(), String> {
        if self.current == token {
            self.advance();
            Ok(())
        } else {
            Err(format!("expected {}, found {}", describe(&token), describe(&self.current)))
        }
    }

    /// Parse a location step
    fn parse_step(&mut self) -> std::result::Result<Step, String> {
        let (axis, test) = match self.current.clone() {
            Token::Dot => {
                self.advance();
                return Ok(step(Axis::SelfNode, NodeTest::Node));
            }
            Token::DoubleDot => {
                self.advance();
                return Ok(step(Axis::Parent, NodeTest::Node));
            }
            Token::At => {
                self.advance();
                (Axis::Attribute, self.parse_node_test()?)
            }
            Token::Axis(name) => {
                let axis = Axis::from_name(&name).ok_or_else(|| format!("unsupported axis '{}'", name))?;
                self.advance();
                self.expect(Token::DoubleColon)?;
                (axis, self.parse_node_test()?)
            }
            _ => (Axis::Child, self.parse_node_test()?),
        };

        let mut predicates = Vec::new();
        while self.current == Token::LeftBracket {
            self.advance();
            predicates.push(self.parse_predicate()?);
            self.expect(Token::RightBracket)?;
        }

        Ok(Step { axis, test, predicates })
    }

    /// Parse a node test
    fn parse_node_test(&mut self) -> std::result::Result<NodeTest, String> {
        let test = match &self.current {
            Token::Star => NodeTest::Wildcard { prefix: None },
            Token::Name(name) => NodeTest::Name {
                prefix: None,
                local: name.clone(),
            },
            Token::NameTest(name) => match split_qualified(name) {
                (Some(prefix), "*") => NodeTest::Wildcard {
                    prefix: Some(prefix.to_string()),
                },
                (prefix, local) => NodeTest::Name {
                    prefix: prefix.map(str::to_string),
                    local: local.to_string(),
                },
            },
            Token::NodeType(kind) => {
                let test = match kind.as_str() {
                    "text" => NodeTest::Text,
                    "comment" => NodeTest::Comment,
                    _ => NodeTest::Node,
                };
                self.advance();
                self.expect(Token::LeftParen)?;
                if self.current != Token::RightParen {
                    return Err("node type tests take no arguments".to_string());
                }
                test
            }
            other => return Err(format!("expected a name test, found {}", describe(other))),
        };
        self.advance();
        Ok(test)
    }

    /// Parse the inside of `[...]`
    fn parse_predicate(&mut self) -> std::result::Result<Predicate, String> {
        match self.current {
            Token::Number(n) => {
                if n < 1.0 || n.fract() != 0.0 {
                    return Err(format!("position {} is not a positive integer", n));
                }
                self.advance();
                Ok(Predicate::Position(n as usize))
            }
            Token::At => {
                self.advance();
                let test = self.parse_node_test()?;
                let value = self.parse_comparison()?;
                Ok(Predicate::Attribute { test, value })
            }
            _ => {
                let test = self.parse_node_test()?;
                let value = self.parse_comparison()?;
                Ok(Predicate::Child { test, value })
            }
        }
    }

    /// Optional `= 'literal'`
    fn parse_comparison(&mut self) -> std::result::Result<Option<String>, String> {
        if self.current != Token::Eq {
            return Ok(None);
        }
        self.advance();
        match &self.current {
            Token::String(value) => {
                let value = value.clone();
                self.advance();
                Ok(Some(value))
            }
            other => Err(format!("expected a string literal, found {}", describe(other))),
        }
    }
}

fn step(axis: Axis, test: NodeTest) -> Step {
    Step {
        axis,
        test,
        predicates: Vec::new(),
    }
}

/// `//` is shorthand for `/descendant-or-self::node()/`
fn descendant_or_self() -> Step {
    step(Axis::DescendantOrSelf, NodeTest::Node)
}

fn describe(token: &Token) -> String {
    match token {
        Token::Eof => "end of selector".to_string(),
        Token::Invalid(text) => format!("'{}'", text),
        Token::Name(name) | Token::NameTest(name) => format!("name '{}'", name),
        Token::String(s) => format!("string '{}'", s),
        Token::Number(n) => format!("number {}", n),
        other => format!("{:?}", other),
    }
}

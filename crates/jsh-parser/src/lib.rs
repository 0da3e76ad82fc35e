//! Turns one raw command line into a [`Pipeline`].
//!
//! The grammar is deliberately small: whitespace-separated words, `|`
//! between stages, `<` and `>` with a file name, and a trailing `&`. The
//! operators do not need surrounding whitespace.

use jsh_protocol::{ParseError, Pipeline, Stage};

#[derive(Debug, PartialEq, Eq)]
enum Token {
    Word(String),
    Pipe,
    RedirectIn,
    RedirectOut,
    Background,
}

fn tokenize(line: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut word = String::new();
    for ch in line.chars() {
        let operator = match ch {
            '|' => Some(Token::Pipe),
            '<' => Some(Token::RedirectIn),
            '>' => Some(Token::RedirectOut),
            '&' => Some(Token::Background),
            _ => None,
        };
        match operator {
            Some(token) => {
                if !word.is_empty() {
                    tokens.push(Token::Word(std::mem::take(&mut word)));
                }
                tokens.push(token);
            }
            None if ch.is_whitespace() => {
                if !word.is_empty() {
                    tokens.push(Token::Word(std::mem::take(&mut word)));
                }
            }
            None => word.push(ch),
        }
    }
    if !word.is_empty() {
        tokens.push(Token::Word(word));
    }
    tokens
}

/// Parses one line. The returned pipeline always has at least one stage.
pub fn parse_line(line: &str) -> Result<Pipeline, ParseError> {
    let mut stages: Vec<Stage> = Vec::new();
    let mut current: Option<Stage> = None;
    let mut input = None;
    let mut output = None;
    let mut background = false;

    let mut tokens = tokenize(line).into_iter();
    while let Some(token) = tokens.next() {
        if background {
            // nothing may follow the background marker
            let token = match token {
                Token::Word(word) => word,
                Token::Pipe => "|".into(),
                Token::RedirectIn => "<".into(),
                Token::RedirectOut => ">".into(),
                Token::Background => "&".into(),
            };
            return Err(ParseError::UnexpectedToken { token });
        }
        match token {
            Token::Word(word) => match current.as_mut() {
                Some(stage) => stage.args.push(word),
                None => current = Some(Stage::new(word)),
            },
            Token::Pipe => {
                let stage = current.take().ok_or(ParseError::MissingCommand)?;
                stages.push(stage);
            }
            Token::RedirectIn => {
                let Some(Token::Word(path)) = tokens.next() else {
                    return Err(ParseError::MissingRedirectTarget { operator: '<' });
                };
                if input.replace(path).is_some() {
                    return Err(ParseError::DuplicateRedirect { kind: "input" });
                }
            }
            Token::RedirectOut => {
                let Some(Token::Word(path)) = tokens.next() else {
                    return Err(ParseError::MissingRedirectTarget { operator: '>' });
                };
                if output.replace(path).is_some() {
                    return Err(ParseError::DuplicateRedirect { kind: "output" });
                }
            }
            Token::Background => background = true,
        }
    }

    stages.push(current.ok_or(ParseError::MissingCommand)?);

    let mut pipeline = Pipeline::new(stages);
    pipeline.input = input;
    pipeline.output = output;
    pipeline.background = background;
    Ok(pipeline)
}

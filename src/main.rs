use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::Parser as ClapParser;
use clap::Subcommand;

use rox::ast_printer::AstPrinter;
use rox::interpreter::Interpreter;
use rox::parser::Parser;
use rox::resolver::Resolver;
use rox::scanner::Scanner;
use rox::stmt::Stmt;

#[derive(ClapParser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    commands: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes the provided input from a given valid filepath
    Tokenize { filename: Option<PathBuf> },

    /// Parses the provided input and prints the expression tree
    Parse { filename: Option<PathBuf> },

    /// Runs a script, or starts a REPL when no filepath is given
    Run { filename: Option<PathBuf> },
}

fn main() -> anyhow::Result<()> {
    let args: Cli = Cli::parse();

    match args.commands {
        Commands::Tokenize { filename } => match filename {
            Some(filename) => {
                let buf: Vec<u8> = fs::read(filename)?;

                let scanner: Scanner = Scanner::new(buf);
                let mut tokenized = true;

                for token in scanner {
                    match token {
                        Ok(token) => println!("{}", token),

                        Err(e) => {
                            tokenized = false;
                            eprintln!("{}", e);
                        }
                    }
                }

                if !tokenized {
                    std::process::exit(65);
                }
            }

            None => {
                println!("No input filepath was provided. Exiting...");
                std::process::exit(0);
            }
        },

        Commands::Parse { filename } => match filename {
            Some(filename) => {
                let buf: Vec<u8> = fs::read(filename)?;

                let scanner: Scanner = Scanner::new(buf);
                let mut parser: Parser = Parser::new(scanner);

                match parser.parse_expression() {
                    Ok(expr) => {
                        println!("{}", AstPrinter::print(&expr));
                    }
                    Err(e) => {
                        eprintln!("{}", e);
                        std::process::exit(65);
                    }
                }
            }

            None => {
                println!("No input filepath was provided. Exiting...");
                std::process::exit(0);
            }
        },

        Commands::Run { filename } => match filename {
            Some(filename) => run_file(filename)?,

            None => repl()?,
        },
    }

    Ok(())
}

fn run_file(filename: PathBuf) -> anyhow::Result<()> {
    let buf: Vec<u8> = fs::read(filename)?;

    let scanner: Scanner = Scanner::new(buf);
    let mut parser: Parser = Parser::new(scanner);

    let statements: Vec<Stmt> = match parser.parse() {
        Ok(statements) => statements,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(65);
        }
    };

    let mut interpreter = Interpreter::new(io::stdout());

    let mut resolver = Resolver::new(&mut interpreter);
    if let Err(e) = resolver.resolve(&statements) {
        eprintln!("{}", e);
        std::process::exit(65);
    }

    if let Err(e) = interpreter.interpret(&statements) {
        eprintln!("{}", e);
        std::process::exit(70);
    }

    Ok(())
}

// One interpreter lives for the whole session, so definitions persist across
// lines and a runtime error doesn't end the loop.
fn repl() -> anyhow::Result<()> {
    let stdin = io::stdin();
    let mut interpreter = Interpreter::new(io::stdout());
    let mut next_id: usize = 0;

    print!("> ");
    io::stdout().flush()?;

    for line in stdin.lock().lines() {
        let line = line?;

        if !line.trim().is_empty() {
            let scanner = Scanner::new(line.into_bytes());
            let mut parser = Parser::with_id_offset(scanner, next_id);

            match parser.parse() {
                Ok(statements) => {
                    next_id = parser.next_id();

                    let mut resolver = Resolver::new(&mut interpreter);
                    match resolver.resolve(&statements) {
                        Ok(()) => {
                            if let Err(e) = interpreter.interpret(&statements) {
                                eprintln!("{}", e);
                            }
                        }
                        Err(e) => eprintln!("{}", e),
                    }
                }
                Err(e) => eprintln!("{}", e),
            }
        }

        print!("> ");
        io::stdout().flush()?;
    }

    Ok(())
}

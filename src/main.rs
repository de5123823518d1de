use std::io::{stdin, BufRead, Write};

use anyhow::Context;

fn main() -> anyhow::Result<()> {
    cli(sqltree::Parser::new())
}

fn cli(parser: sqltree::Parser) -> anyhow::Result<()> {
    print_flushed("sqltree> ")?;

    let mut line_buffer = String::new();

    while stdin()
        .lock()
        .read_line(&mut line_buffer)
        .context("read stdin")?
        > 0
    {
        match line_buffer.trim() {
            ".exit" => break,
            "" => {}
            sql => display_parse(&parser, sql),
        }

        print_flushed("\nsqltree> ")?;

        line_buffer.clear();
    }

    Ok(())
}

fn display_parse(parser: &sqltree::Parser, sql: &str) {
    let list = parser.parse(sql);
    match list.diagnostic() {
        Some(err) => println!("Error: {err}"),
        None => print!("{}", list.summary()),
    }
}

fn print_flushed(s: &str) -> anyhow::Result<()> {
    print!("{}", s);
    std::io::stdout().flush().context("flush stdout")
}

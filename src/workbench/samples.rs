//! Built-in example programs.

use crate::core::PipelineKind;

pub const LEXICAL_SAMPLE: &str = r#"program teste;
var x, y: integer;
const pi := 3.1416;
begin
    read(x);
    if (x > 0) and (y < 10) then
        result := true or false;
    else
        result := not (x = y);

    while (x < 10) do
        x := x + 1;

    writeln("Resultado: ", result);
    write(x)
end"#;

pub const SYNTACTIC_SAMPLE: &str = "program exemplo;
var x: integer;
begin
    x := (2 + 3) * 4;
    if x >= 10 then
        write(x);
    else
        writeln('menor que 10');
end.";

/// Example program that exercises the given pipeline.
pub fn sample_for(kind: PipelineKind) -> &'static str {
    match kind {
        PipelineKind::Lexical => LEXICAL_SAMPLE,
        PipelineKind::Syntactic => SYNTACTIC_SAMPLE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::TextStats;

    #[test]
    fn samples_are_not_blank() {
        for kind in [PipelineKind::Lexical, PipelineKind::Syntactic] {
            assert!(!sample_for(kind).trim().is_empty());
        }
    }

    #[test]
    fn lexical_sample_shape() {
        let stats = TextStats::of(LEXICAL_SAMPLE);
        assert_eq!(stats.lines, 16);
        assert!(LEXICAL_SAMPLE.starts_with("program teste;"));
        assert!(LEXICAL_SAMPLE.ends_with("end"));
    }
}

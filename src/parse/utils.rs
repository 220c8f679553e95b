use crate::lex::{Token, TokenKind};

fn operator_name(op: &str) -> String {
    let name = match op {
        "**" => "tPOW",
        "<=>" => "tCMP",
        "==" => "tEQ",
        "===" => "tEQQ",
        "!=" => "tNEQ",
        "=~" => "tMATCH",
        "!~" => "tNMATCH",
        ">=" => "tGEQ",
        "<=" => "tLEQ",
        "&&" => "tANDOP",
        "||" => "tOROP",
        "<<" => "tLSHFT",
        ">>" => "tRSHFT",
        ".." => "tDOT2",
        "..." => "tDOT3",
        "::" => "tCOLON2",
        "=>" => "tASSOC",
        "->" => "tLAMBDA",
        "[]" => "tAREF",
        "[]=" => "tASET",
        "+@" => "tUPLUS",
        "-@" => "tUMINUS",
        _ if op.len() > 1 && op.ends_with('=') => "tOP_ASGN",
        _ => return format!("'{}'", op),
    };
    return name.to_string();
}

/**
 * The name Ruby's own parser gives a token in its error messages, so
 * diagnostics read `unexpected keyword_end` or `unexpected tIDENTIFIER`.
 */
pub fn describe(token: &Token) -> String {
    let text = token.text.as_str();
    let name = match token.kind {
        TokenKind::Keyword => return format!("keyword_{}", text.trim_end_matches('?')),
        TokenKind::ModifierKeyword if text == "do" => "keyword_do_cond",
        TokenKind::ModifierKeyword => return format!("modifier_{}", text),
        TokenKind::Ident => "tIDENTIFIER",
        TokenKind::Const => "tCONSTANT",
        TokenKind::IVar => "tIVAR",
        TokenKind::CVar => "tCVAR",
        TokenKind::GVar => "tGVAR",
        TokenKind::Int => "tINTEGER",
        TokenKind::Float => "tFLOAT",
        TokenKind::Symbol | TokenKind::SymBeg => "tSYMBEG",
        TokenKind::CharLit => "tCHAR",
        TokenKind::Label => "tLABEL",
        TokenKind::TStringBeg if text == "`" || text.starts_with("%x") => "tXSTRING_BEG",
        TokenKind::TStringBeg => "tSTRING_BEG",
        TokenKind::TStringContent => "tSTRING_CONTENT",
        TokenKind::TStringEnd => "tSTRING_END",
        TokenKind::EmbExprBeg => "tSTRING_DBEG",
        TokenKind::RegexpBeg => "tREGEXP_BEG",
        TokenKind::RegexpEnd => "tREGEXP_END",
        TokenKind::QWordsBeg if text.starts_with("%W") => "tWORDS_BEG",
        TokenKind::QWordsBeg if text.starts_with("%i") => "tQSYMBOLS_BEG",
        TokenKind::QWordsBeg if text.starts_with("%I") => "tSYMBOLS_BEG",
        TokenKind::QWordsBeg => "tQWORDS_BEG",
        TokenKind::Op => return operator_name(text),
        TokenKind::Period if text == "&." => "tANDDOT",
        TokenKind::Newline | TokenKind::IgnoredNewline => "'\\n'",
        _ => return format!("'{}'", text),
    };
    return name.to_string();
}

//! Display strings for the supported languages.

use crate::session::state::Language;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextKey {
    Title,
    AccessDenied,
    RequiredFields,
    ConfirmWrite,
    GenerationFailed,
    AlreadyGenerating,
    NothingToClear,
    Generating,
    Stopped,
    Copied,
    CopyFailed,
    Help,
}

pub fn text(language: Language, key: TextKey) -> &'static str {
    match language {
        Language::En => english(key),
        Language::Ja => japanese(key),
    }
}

fn english(key: TextKey) -> &'static str {
    match key {
        TextKey::Title => "AI SQL Generator",
        TextKey::AccessDenied => "Access denied",
        TextKey::RequiredFields => "Please enter both the schema and the criteria.",
        TextKey::ConfirmWrite => {
            "Write mode can generate statements that modify data. Continue?"
        }
        TextKey::GenerationFailed => "Failed to generate SQL",
        TextKey::AlreadyGenerating => "A generation is already in progress.",
        TextKey::NothingToClear => "Nothing to clear.",
        TextKey::Generating => "Generating...",
        TextKey::Stopped => "Generation stopped.",
        TextKey::Copied => "Copied!",
        TextKey::CopyFailed => "Could not copy to the clipboard.",
        TextKey::Help => {
            "Commands: :lang <en|ja>  :db <mysql|postgresql|sqlserver|sqlite>  :mode <read|write>\n\
             :schema (end with a line containing '.')  :criteria <text>  :generate  :stop\n\
             :clear  :copy  :show  :help  :quit"
        }
    }
}

fn japanese(key: TextKey) -> &'static str {
    match key {
        TextKey::Title => "AI SQL ジェネレーター",
        TextKey::AccessDenied => "アクセスが拒否されました",
        TextKey::RequiredFields => "スキーマと条件の両方を入力してください。",
        TextKey::ConfirmWrite => "書き込みモードではデータを変更する SQL が生成される可能性があります。続行しますか?",
        TextKey::GenerationFailed => "SQL の生成に失敗しました",
        TextKey::AlreadyGenerating => "生成処理はすでに実行中です。",
        TextKey::NothingToClear => "クリアする内容がありません。",
        TextKey::Generating => "生成中...",
        TextKey::Stopped => "生成を停止しました。",
        TextKey::Copied => "コピーしました!",
        TextKey::CopyFailed => "クリップボードにコピーできませんでした。",
        TextKey::Help => {
            "コマンド: :lang <en|ja>  :db <mysql|postgresql|sqlserver|sqlite>  :mode <read|write>\n\
             :schema ('.' だけの行で終了)  :criteria <テキスト>  :generate  :stop\n\
             :clear  :copy  :show  :help  :quit"
        }
    }
}

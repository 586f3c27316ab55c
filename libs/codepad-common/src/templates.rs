//! Static language table: extensions, boilerplate and execution ids.

use crate::error::{ConfigError, SessionError};
use crate::types::Language;

const JAVASCRIPT_TEMPLATE: &str = r#"// JavaScript Starter Code
console.log("Hello, World!");
"#;

const PYTHON_TEMPLATE: &str = r#"# Python Starter Code
print("Hello, World!")
"#;

const CPP_TEMPLATE: &str = r#"// C++ Starter Code
#include <iostream>

int main() {
    std::cout << "Hello, World!" << std::endl;
    return 0;
}
"#;

const JAVA_TEMPLATE: &str = r#"// Java Starter Code
public class Main {
    public static void main(String[] args) {
        System.out.println("Hello, World!");
    }
}
"#;

const C_TEMPLATE: &str = r#"// C Starter Code
#include <stdio.h>

int main() {
    printf("Hello, World!\n");
    return 0;
}
"#;

/// Boilerplate source a new file of `language` starts with
pub fn template_for(language: Language) -> &'static str {
    match language {
        Language::JavaScript => JAVASCRIPT_TEMPLATE,
        Language::Python => PYTHON_TEMPLATE,
        Language::Cpp => CPP_TEMPLATE,
        Language::Java => JAVA_TEMPLATE,
        Language::C => C_TEMPLATE,
    }
}

/// Language identifier the execution service expects
pub fn execution_id_for(language: Language) -> u32 {
    match language {
        Language::JavaScript => 63,
        Language::Python => 71,
        Language::Cpp => 54,
        Language::Java => 62,
        Language::C => 50,
    }
}

pub fn extension_for(language: Language) -> &'static str {
    match language {
        Language::JavaScript => "js",
        Language::Python => "py",
        Language::Cpp => "cpp",
        Language::Java => "java",
        Language::C => "c",
    }
}

/// Resolve a bare extension (without the dot), case-insensitively
pub fn language_for_extension(ext: &str) -> Result<Language, ConfigError> {
    match ext.to_lowercase().as_str() {
        "js" => Ok(Language::JavaScript),
        "py" => Ok(Language::Python),
        "cpp" => Ok(Language::Cpp),
        "java" => Ok(Language::Java),
        "c" => Ok(Language::C),
        _ => Err(ConfigError::UnsupportedExtension(ext.to_string())),
    }
}

/// Validate a file name and resolve its language from the extension.
///
/// The name must have a non-empty stem and a recognized extension after the
/// last `.`. Surrounding whitespace is ignored.
pub fn language_for_file_name(name: &str) -> Result<Language, SessionError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(SessionError::invalid_file_name(name, "name is empty"));
    }

    let (stem, ext) = trimmed.rsplit_once('.').ok_or_else(|| {
        SessionError::invalid_file_name(
            name,
            "include a file extension (.js, .py, .cpp, .java, .c)",
        )
    })?;

    if stem.is_empty() {
        return Err(SessionError::invalid_file_name(name, "name is missing before the extension"));
    }

    language_for_extension(ext).map_err(|e| SessionError::invalid_file_name(name, e.to_string()))
}

/// Swap the extension of an already-valid file name for `language`'s one
pub fn rename_for_language(name: &str, language: Language) -> String {
    let stem = name
        .trim()
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or_else(|| name.trim());
    format!("{}.{}", stem, extension_for(language))
}

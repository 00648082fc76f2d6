use std::collections::BTreeMap;

use crate::atom::Atom;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Symbol {
    name: String,
    value: Atom,
    // Index 0 is the definition line once defined, otherwise the first use
    references: Vec<usize>,
}

impl Symbol {
    pub fn new(name: &str, value: Atom) -> Symbol {
        Symbol { name: name.to_string(), value, references: Vec::new() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &Atom {
        &self.value
    }

    pub fn is_defined(&self) -> bool {
        self.value.is_valid()
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
    }

    pub fn definition(&self) -> Option<usize> {
        if self.is_defined() { self.references.first().cloned() } else { None }
    }

    pub fn references(&self) -> &[usize] {
        &self.references
    }
}


// Symbol table with cross references
//
// Names are case sensitive. `by_line` is the reverse index used for "which symbols
// does line N touch".
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    symbols: BTreeMap<String, Symbol>,
    by_line: BTreeMap<usize, Vec<String>>,
}

impl SymbolTable {
    pub fn new() -> SymbolTable {
        SymbolTable::default()
    }

    pub fn clear(&mut self) {
        self.symbols.clear();
        self.by_line.clear();
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    // False and untouched if the name is already present
    pub fn insert(&mut self, name: &str, value: Atom) -> bool {
        if self.contains(name) {
            return false;
        }
        self.symbols.insert(name.to_string(), Symbol::new(name, value));
        true
    }

    // False if the name is absent
    pub fn set_value(&mut self, name: &str, value: Atom) -> bool {
        match self.symbols.get_mut(name) {
            Some(sym) => {
                sym.value = value;
                true
            },
            None => false,
        }
    }

    // Empty symbol if absent
    pub fn lookup(&self, name: &str) -> Symbol {
        self.symbols.get(name).cloned().unwrap_or_default()
    }

    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }

    // Records a use of `name` on `line`, creating an undefined placeholder for unknown
    // names. Returns whether the symbol already had a value.
    pub fn add_reference(&mut self, line: usize, name: &str) -> bool {
        let sym = self.symbols
            .entry(name.to_string())
            .or_insert_with(|| Symbol::new(name, Atom::Invalid));
        sym.references.push(line);
        let defined = sym.is_defined();

        self.index(line, name);
        defined
    }

    // Binds `name` defined on `line`. A placeholder left by earlier uses takes the
    // value and gets the definition line moved to the front of its references.
    pub fn define(&mut self, name: &str, value: Atom, line: usize) -> bool {
        match self.symbols.get_mut(name) {
            Some(sym) if sym.is_defined() => return false,
            Some(sym) => {
                sym.value = value;
                sym.references.insert(0, line);
            },
            None => {
                let mut sym = Symbol::new(name, value);
                sym.references.push(line);
                self.symbols.insert(name.to_string(), sym);
            },
        }
        self.index(line, name);
        true
    }

    pub fn references_in(&self, line: usize) -> Vec<&Symbol> {
        match self.by_line.get(&line) {
            Some(names) => names.iter().filter_map(|n| self.symbols.get(n)).collect(),
            None => Vec::new(),
        }
    }

    // Sorted
    pub fn names(&self) -> Vec<String> {
        self.symbols.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.values()
    }

    // Referenced but never defined
    pub fn undefined(&self) -> Vec<&Symbol> {
        self.symbols.values().filter(|s| !s.is_defined()).collect()
    }

    fn index(&mut self, line: usize, name: &str) {
        let names = self.by_line.entry(line).or_insert_with(Vec::new);
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
}

// Table name of a symbol as written in the source
//
// Names starting with '.' are local to the last global label, `.loop` under `main`
// is stored as `main.loop` and can be reached by that name from anywhere.
pub fn scoped(scope: &str, name: &str) -> String {
    if name.starts_with('.') {
        format!("{}{}", scope, name)
    } else {
        name.to_string()
    }
}


#[cfg(test)]
mod symbol_tests {
    use super::*;

    #[test]
    fn test_insert_and_lookup() {
        let mut table = SymbolTable::new();
        assert!(table.insert("foo", Atom::Long(5)));
        assert!(!table.insert("foo", Atom::Long(6)));
        assert_eq!(table.lookup("foo").value(), &Atom::Long(5));

        assert!(table.contains("foo"));
        assert!(!table.contains("FOO"));
        assert!(table.lookup("bar").is_empty());
        assert_eq!(table.get("bar"), None);
    }

    #[test]
    fn test_scoped() {
        assert_eq!(scoped("main", ".loop"), "main.loop");
        assert_eq!(scoped("main", "loop"), "loop");
        assert_eq!(scoped("", ".loop"), ".loop");
    }

    #[test]
    fn test_set_value() {
        let mut table = SymbolTable::new();
        assert!(!table.set_value("foo", Atom::Long(1)));
        table.insert("foo", Atom::Long(5));
        assert!(table.set_value("foo", Atom::Long(1)));
        assert_eq!(table.lookup("foo").value(), &Atom::Long(1));
    }

    #[test]
    fn test_placeholder_then_define() {
        let mut table = SymbolTable::new();
        assert!(!table.add_reference(2, "later"));
        assert!(!table.add_reference(3, "later"));
        assert!(!table.lookup("later").is_defined());
        assert_eq!(table.lookup("later").definition(), None);

        assert!(table.define("later", Atom::Addr(8), 7));
        let sym = table.lookup("later");
        assert_eq!(sym.references(), &[7, 2, 3]);
        assert_eq!(sym.definition(), Some(7));

        assert!(!table.define("later", Atom::Addr(9), 9));
        assert_eq!(table.lookup("later").value(), &Atom::Addr(8));
    }

    #[test]
    fn test_references_in() {
        let mut table = SymbolTable::new();
        table.define("a", Atom::Addr(0), 1);
        table.define("b", Atom::Addr(1), 2);
        assert!(table.add_reference(3, "a"));
        assert!(table.add_reference(3, "b"));
        assert!(table.add_reference(3, "a"));

        let names: Vec<&str> = table.references_in(3).iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert!(table.references_in(4).is_empty());
        assert_eq!(table.lookup("a").references(), &[1, 3, 3]);
    }

    #[test]
    fn test_names_sorted() {
        let mut table = SymbolTable::new();
        table.insert("zeta", Atom::Long(0));
        table.insert("alpha", Atom::Long(0));
        table.add_reference(1, "mid");
        assert_eq!(table.names(), vec!["alpha", "mid", "zeta"]);
        assert_eq!(table.undefined().len(), 1);

        table.clear();
        assert!(table.is_empty());
    }
}

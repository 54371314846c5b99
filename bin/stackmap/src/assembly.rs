//! Textual assembly for classes and method bodies
//!
//! ```text
//! # classes have to be declared before they are used as a superclass or interface
//! class me/Shape
//! class me/Circle extends me/Shape implements java/lang/Comparable
//! interface me/Named
//!
//! method public static me/Example.count (I)I
//!         iconst_0
//!         istore_1
//! loop:   iload_1
//!         iload_0
//!         if_icmpge done
//!         iinc 1 1
//!         goto loop
//! done:   iload_1
//!         ireturn
//!   .local 1 loop done counter I
//! end
//! ```
//!
//! Operands follow the mnemonic:
//!
//!   - integers for `bipush`/`sipush`, local slots, and `iinc <slot> <delta>`
//!   - labels for jumps, `<key>:<label>` pairs plus `default:<label>` for switches
//!   - `<class>.<name> <descriptor>` for fields and methods, `<name> <descriptor>` for
//!     `invokedynamic`
//!   - class names or array descriptors for `new`, `checkcast`, `anewarray`, and friends
//!   - `<kind> <value>` for `ldc`, where kind is one of `int`, `float`, `long`, `double`,
//!     `string`, `class`, `methodtype`, `methodhandle`, or `dynamic`
//!
//! Exception handlers are `.catch <start> <end> <handler> [<class>]` (both ends inclusive, no
//! class catches everything) and local variable entries are
//! `.local <slot> <start> <end> <name> <descriptor>`.

use stackmap::jvm::class_graph::{ClassData, ClassGraph};
use stackmap::jvm::code::{
    CallSiteRef, Constant, ExceptionHandler, FieldRef, InsnId, Instruction, LocalVariable,
    MethodBody, MethodRef, Opcode, Operand, OperandKind, SwitchTable,
};
use stackmap::jvm::{
    BaseType, BinaryName, ClassAccessFlags, Error, FieldType, MethodAccessFlags,
    MethodDescriptor, Name, ParseDescriptor, RefType, UnqualifiedName,
};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Problem in the assembly source, with the (1-based) line where it was found
#[derive(Debug)]
pub struct AssemblyError {
    pub line: usize,
    pub message: String,
}

impl fmt::Display for AssemblyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

fn syntax(line: usize, message: impl Into<String>) -> AssemblyError {
    AssemblyError {
        line,
        message: message.into(),
    }
}

/// Class or interface to add to the class graph
#[derive(Debug)]
pub struct ClassDeclaration {
    pub name: BinaryName,
    pub superclass: Option<BinaryName>,
    pub interfaces: Vec<BinaryName>,
    pub is_interface: bool,
}

impl ClassDeclaration {
    /// Insert the class, resolving its supertypes against what is already in the graph
    pub fn add_to_graph(&self, class_graph: &ClassGraph<'_>) -> Result<(), Error> {
        let lookup = |name: &BinaryName| {
            class_graph
                .lookup_class(name)
                .ok_or_else(|| Error::missing_class(name))
        };

        let superclass = lookup(self.superclass.as_ref().unwrap_or(&BinaryName::OBJECT))?;
        let access_flags = if self.is_interface {
            ClassAccessFlags::PUBLIC | ClassAccessFlags::INTERFACE | ClassAccessFlags::ABSTRACT
        } else {
            ClassAccessFlags::PUBLIC
        };
        let class = class_graph.add_class(ClassData::new(self.name.clone(), superclass, access_flags));
        for interface in &self.interfaces {
            class.add_interface(lookup(interface)?);
        }
        Ok(())
    }
}

/// Everything declared in an assembly file
#[derive(Default)]
pub struct Program {
    pub classes: Vec<ClassDeclaration>,
    pub methods: Vec<MethodBody>,
}

/// Parse a whole assembly file
pub fn parse(source: &str) -> Result<Program, AssemblyError> {
    let mut program = Program::default();
    let mut lines = source
        .lines()
        .enumerate()
        .map(|(index, text)| (index + 1, strip_comment(text).trim()))
        .filter(|(_, text)| !text.is_empty());

    while let Some((line, text)) = lines.next() {
        let mut words = text.split_whitespace();
        match words.next() {
            Some("class") => program.classes.push(class_declaration(line, words, false)?),
            Some("interface") => program.classes.push(class_declaration(line, words, true)?),
            Some("method") => {
                let header: Vec<&str> = words.collect();
                let mut body = vec![];
                loop {
                    match lines.next() {
                        Some((_, "end")) => break,
                        Some(body_line) => body.push(body_line),
                        None => return Err(syntax(line, "method has no closing `end`")),
                    }
                }
                program.methods.push(method(line, &header, &body)?);
            }
            Some(other) => return Err(syntax(line, format!("unexpected `{}`", other))),
            None => (),
        }
    }

    Ok(program)
}

/// Drop everything from a `#` which starts a word
fn strip_comment(text: &str) -> &str {
    let mut previous = ' ';
    for (index, c) in text.char_indices() {
        if c == '#' && previous.is_whitespace() {
            return &text[..index];
        }
        previous = c;
    }
    text
}

fn class_declaration<'a>(
    line: usize,
    mut words: impl Iterator<Item = &'a str>,
    is_interface: bool,
) -> Result<ClassDeclaration, AssemblyError> {
    let name = binary_name(line, words.next())?;
    let mut superclass = None;
    let mut interfaces = vec![];

    let mut clause = None;
    for word in words {
        match (word, clause) {
            ("extends", _) => clause = Some("extends"),
            ("implements", _) => clause = Some("implements"),

            // Interfaces "extend" other interfaces
            (_, Some("extends")) if is_interface => interfaces.push(binary_name(line, Some(word))?),
            (_, Some("extends")) if superclass.is_none() => {
                superclass = Some(binary_name(line, Some(word))?)
            }
            (_, Some("implements")) if !is_interface => {
                interfaces.push(binary_name(line, Some(word))?)
            }
            _ => return Err(syntax(line, format!("unexpected `{}` in class header", word))),
        }
    }

    Ok(ClassDeclaration {
        name,
        superclass,
        interfaces,
        is_interface,
    })
}

/// Parse a method header (`[flags] <class>.<name> <descriptor>`) and its body
fn method(
    line: usize,
    header: &[&str],
    body: &[(usize, &str)],
) -> Result<MethodBody, AssemblyError> {
    let (flags, member) = match header {
        [flags @ .., member, descriptor] => (flags, (*member, *descriptor)),
        _ => return Err(syntax(line, "expected `method [flags] <class>.<name> <descriptor>`")),
    };

    let mut access_flags = MethodAccessFlags::empty();
    for flag in flags {
        access_flags |= MethodAccessFlags::from_keyword(flag)
            .ok_or_else(|| syntax(line, format!("unknown method modifier `{}`", flag)))?;
    }
    let (class, name) = member
        .0
        .rsplit_once('.')
        .ok_or_else(|| syntax(line, "method name must be qualified by its class"))?;

    let mut method = MethodBody::new(
        binary_name(line, Some(class))?,
        unqualified_name(line, Some(name))?,
        descriptor(line, member.1)?,
        access_flags,
    );

    // First pass: lay down a placeholder per instruction, so labels have something to point at
    let mut labels: HashMap<&str, InsnId> = HashMap::new();
    let mut pending_labels: Vec<&str> = vec![];
    let mut instructions: Vec<(usize, InsnId, Option<&str>, &str)> = vec![];
    let mut directives: Vec<(usize, &str)> = vec![];
    for &(line, text) in body {
        let mut text = text;
        while let Some((label, rest)) = split_label(text) {
            pending_labels.push(label);
            text = rest;
        }
        if text.is_empty() {
            continue;
        }
        if text.starts_with('.') {
            directives.push((line, text));
            continue;
        }

        let placeholder = Instruction::simple(Opcode::Nop).map_err(|err| jvm(line, err))?;
        let id = method.instructions.push(placeholder);
        let display_label = pending_labels.first().copied();
        for label in pending_labels.drain(..) {
            if labels.insert(label, id).is_some() {
                return Err(syntax(line, format!("label `{}` is defined twice", label)));
            }
        }
        instructions.push((line, id, display_label, text));
    }
    if let Some(label) = pending_labels.first() {
        return Err(syntax(line, format!("label `{}` is not followed by an instruction", label)));
    }

    // Second pass: now that every label resolves, swap in the real instructions
    for (line, id, display_label, text) in instructions {
        let mut instruction = instruction(line, text, &labels)?;
        if let Some(display_label) = display_label {
            instruction = instruction.with_label(display_label);
        }
        method
            .instructions
            .replace(id, instruction)
            .map_err(|err| jvm(line, err))?;
    }

    for (line, text) in directives {
        let words: Vec<&str> = text.split_whitespace().collect();
        match words.as_slice() {
            [".catch", start, end, handler, catch_type @ ..] => {
                let catch_type = match catch_type {
                    [] | ["any"] => None,
                    [class] => Some(binary_name(line, Some(*class))?),
                    _ => return Err(syntax(line, "`.catch` takes at most one class")),
                };
                method.exception_handlers.push(ExceptionHandler {
                    try_start: label(line, start, &labels)?,
                    try_end: label(line, end, &labels)?,
                    handler: label(line, handler, &labels)?,
                    catch_type,
                });
            }
            [".local", slot, start, end, name, descriptor] => {
                method.local_variables.push(LocalVariable {
                    slot: number(line, Some(*slot))?,
                    start: label(line, start, &labels)?,
                    end: label(line, end, &labels)?,
                    name: unqualified_name(line, Some(*name))?,
                    descriptor: field_type(line, descriptor)?,
                });
            }
            _ => return Err(syntax(line, format!("malformed directive `{}`", text))),
        }
    }

    Ok(method)
}

/// Split off a leading `label:` if there is one
fn split_label(text: &str) -> Option<(&str, &str)> {
    let (first, rest) = match text.split_once(char::is_whitespace) {
        Some((first, rest)) => (first, rest.trim_start()),
        None => (text, ""),
    };
    let label = first.strip_suffix(':')?;
    if label.is_empty() {
        None
    } else {
        Some((label, rest))
    }
}

fn instruction(
    line: usize,
    text: &str,
    labels: &HashMap<&str, InsnId>,
) -> Result<Instruction, AssemblyError> {
    let (mnemonic, rest) = match text.split_once(char::is_whitespace) {
        Some((mnemonic, rest)) => (mnemonic, rest.trim()),
        None => (text, ""),
    };
    let opcode = Opcode::from_mnemonic(mnemonic)
        .ok_or_else(|| syntax(line, format!("unknown mnemonic `{}`", mnemonic)))?;
    let mut words = rest.split_whitespace();

    let operand = match opcode.info().operand {
        OperandKind::None => Operand::None,
        OperandKind::Byte | OperandKind::Short => Operand::Int(number(line, words.next())?),
        OperandKind::Constant | OperandKind::WideConstant => {
            Operand::Constant(constant(line, rest)?)
        }
        OperandKind::Local => Operand::Local(number(line, words.next())?),
        OperandKind::LocalIncrement => Operand::Increment {
            local: number(line, words.next())?,
            delta: number(line, words.next())?,
        },
        OperandKind::Branch | OperandKind::WideBranch => {
            let target = words.next().ok_or_else(|| syntax(line, "missing jump target"))?;
            Operand::Branch(label(line, target, labels)?)
        }
        OperandKind::Switch => Operand::Switch(switch_table(line, words, labels)?),
        OperandKind::Field => {
            let (class, name) = qualified_member(line, words.next())?;
            Operand::Field(FieldRef {
                class: binary_name(line, Some(class))?,
                name: unqualified_name(line, Some(name))?,
                descriptor: field_type(line, words.next().unwrap_or(""))?,
            })
        }
        OperandKind::Method => Operand::Method(method_ref(line, words.next(), words.next())?),
        OperandKind::Dynamic => Operand::Dynamic(CallSiteRef {
            name: unqualified_name(line, words.next())?,
            descriptor: descriptor(line, words.next().unwrap_or(""))?,
        }),
        OperandKind::Type => Operand::Type(ref_type(line, words.next())?),
        OperandKind::MultiArray => Operand::MultiArray {
            array_type: ref_type(line, words.next())?,
            dimensions: number(line, words.next())?,
        },
        OperandKind::PrimitiveType => Operand::Primitive(base_type(line, words.next())?),
    };

    Instruction::new(opcode, operand).map_err(|err| jvm(line, err))
}

fn switch_table<'a>(
    line: usize,
    words: impl Iterator<Item = &'a str>,
    labels: &HashMap<&str, InsnId>,
) -> Result<SwitchTable, AssemblyError> {
    let mut default = None;
    let mut cases = vec![];
    for word in words {
        let (key, target) = word
            .split_once(':')
            .ok_or_else(|| syntax(line, format!("expected `<key>:<label>`, found `{}`", word)))?;
        let target = label(line, target, labels)?;
        if key == "default" {
            default = Some(target);
        } else {
            cases.push((number(line, Some(key))?, target));
        }
    }
    let default = default.ok_or_else(|| syntax(line, "switch has no `default` target"))?;
    Ok(SwitchTable { default, cases })
}

fn constant(line: usize, text: &str) -> Result<Constant, AssemblyError> {
    let (kind, value) = text
        .split_once(char::is_whitespace)
        .ok_or_else(|| syntax(line, "expected `<kind> <value>` constant"))?;
    let value = value.trim();
    Ok(match kind {
        "int" => Constant::Integer(number(line, Some(value))?),
        "float" => Constant::Float(number(line, Some(value))?),
        "long" => Constant::Long(number(line, Some(value))?),
        "double" => Constant::Double(number(line, Some(value))?),
        "string" => {
            let unquoted = value
                .strip_prefix('"')
                .and_then(|value| value.strip_suffix('"'))
                .unwrap_or(value);
            Constant::String(unquoted.to_owned())
        }
        "class" => Constant::Class(ref_type(line, Some(value))?),
        "methodtype" => Constant::MethodType(descriptor(line, value)?),
        "methodhandle" => {
            let mut words = value.split_whitespace();
            Constant::MethodHandle(method_ref(line, words.next(), words.next())?)
        }
        "dynamic" => Constant::Dynamic(field_type(line, value)?),
        other => return Err(syntax(line, format!("unknown constant kind `{}`", other))),
    })
}

fn label(line: usize, name: &str, labels: &HashMap<&str, InsnId>) -> Result<InsnId, AssemblyError> {
    labels
        .get(name)
        .copied()
        .ok_or_else(|| syntax(line, format!("undefined label `{}`", name)))
}

fn number<T: FromStr>(line: usize, word: Option<&str>) -> Result<T, AssemblyError> {
    let word = word.ok_or_else(|| syntax(line, "missing number"))?;
    word.parse()
        .map_err(|_| syntax(line, format!("`{}` is not a valid number here", word)))
}

fn jvm(line: usize, error: Error) -> AssemblyError {
    syntax(line, format!("{:?}", error))
}

fn binary_name(line: usize, word: Option<&str>) -> Result<BinaryName, AssemblyError> {
    let word = word.ok_or_else(|| syntax(line, "missing class name"))?;
    BinaryName::from_str(word).map_err(|msg| syntax(line, msg))
}

fn unqualified_name(line: usize, word: Option<&str>) -> Result<UnqualifiedName, AssemblyError> {
    let word = word.ok_or_else(|| syntax(line, "missing member name"))?;
    UnqualifiedName::from_str(word).map_err(|msg| syntax(line, msg))
}

fn descriptor(line: usize, word: &str) -> Result<MethodDescriptor<BinaryName>, AssemblyError> {
    MethodDescriptor::parse(word).map_err(|err| syntax(line, format!("`{}`: {}", word, err)))
}

fn field_type(line: usize, word: &str) -> Result<FieldType<BinaryName>, AssemblyError> {
    FieldType::parse(word).map_err(|err| syntax(line, format!("`{}`: {}", word, err)))
}

/// Class name (`java/lang/String`) or array descriptor (`[I`)
fn ref_type(line: usize, word: Option<&str>) -> Result<RefType<BinaryName>, AssemblyError> {
    let word = word.ok_or_else(|| syntax(line, "missing type"))?;
    if word.starts_with('[') {
        RefType::parse(word).map_err(|err| syntax(line, format!("`{}`: {}", word, err)))
    } else {
        Ok(RefType::Object(binary_name(line, Some(word))?))
    }
}

fn qualified_member(line: usize, word: Option<&str>) -> Result<(&str, &str), AssemblyError> {
    let word = word.ok_or_else(|| syntax(line, "missing member"))?;
    word.rsplit_once('.')
        .ok_or_else(|| syntax(line, format!("`{}` should look like `<class>.<name>`", word)))
}

fn method_ref(
    line: usize,
    member: Option<&str>,
    method_descriptor: Option<&str>,
) -> Result<MethodRef, AssemblyError> {
    let (class, name) = qualified_member(line, member)?;
    Ok(MethodRef {
        class: ref_type(line, Some(class))?,
        name: unqualified_name(line, Some(name))?,
        descriptor: descriptor(line, method_descriptor.unwrap_or(""))?,
    })
}

fn base_type(line: usize, word: Option<&str>) -> Result<BaseType, AssemblyError> {
    Ok(match word {
        Some("boolean") => BaseType::Boolean,
        Some("byte") => BaseType::Byte,
        Some("char") => BaseType::Char,
        Some("short") => BaseType::Short,
        Some("int") => BaseType::Int,
        Some("long") => BaseType::Long,
        Some("float") => BaseType::Float,
        Some("double") => BaseType::Double,
        _ => return Err(syntax(line, "expected a primitive type name")),
    })
}

#[cfg(test)]
mod test {
    use super::*;

    const COUNTER: &str = "
        # count up to the argument
        class me/Shape
        interface me/Named extends java/lang/CharSequence
        class me/Circle extends me/Shape implements me/Named

        method public static me/Example.count (I)I
                iconst_0
                istore_1
        loop:   iload_1
                iload_0
                if_icmpge done
                iinc 1 1
                goto loop
        done:   iload_1
                ireturn
          .local 1 loop done counter I
        end
    ";

    #[test]
    fn parses_classes_and_methods() {
        let program = parse(COUNTER).unwrap();
        assert_eq!(program.classes.len(), 3);
        assert_eq!(program.classes[2].superclass, Some(BinaryName::from_str("me/Shape").unwrap()));
        assert!(program.classes[1].is_interface);
        assert_eq!(program.classes[1].interfaces, vec![BinaryName::CHARSEQUENCE]);

        let method = &program.methods[0];
        assert!(method.is_static());
        assert_eq!(method.instructions.len(), 9);
        assert_eq!(method.instructions.code_length(), 15);
        assert_eq!(method.local_variables.len(), 1);

        let (_, jump) = method.instructions.iter().nth(4).unwrap();
        let done = method.instructions.at_offset(13).unwrap();
        assert_eq!(jump.operand, Operand::Branch(done));
        assert_eq!(method.instructions.get(done).unwrap().label.as_deref(), Some("done"));
    }

    #[test]
    fn parses_operands() {
        let source = "
            method me/Example.operands ()V
            start:  ldc string \"two words\"
                    ldc2_w long 5
                    getstatic java/lang/System.out Ljava/io/PrintStream;
                    invokevirtual [I.clone ()Ljava/lang/Object;
                    multianewarray [[I 2
                    newarray int
                    tableswitch default:start 0:start 1:exit
            exit:   return
              .catch start exit exit java/lang/Exception
              .catch start exit exit any
            end
        ";
        let program = parse(source).unwrap();
        let method = &program.methods[0];
        let operands: Vec<&Operand> = method
            .instructions
            .iter()
            .map(|(_, insn)| &insn.operand)
            .collect();
        assert_eq!(
            operands[0],
            &Operand::Constant(Constant::String("two words".to_owned()))
        );
        assert_eq!(operands[1], &Operand::Constant(Constant::Long(5)));
        assert!(matches!(operands[3], Operand::Method(MethodRef { class, .. }) if class.is_array()));
        assert!(matches!(operands[4], Operand::MultiArray { dimensions: 2, .. }));
        assert_eq!(operands[5], &Operand::Primitive(BaseType::Int));
        assert!(matches!(operands[6], Operand::Switch(table) if table.cases.len() == 2));
        assert_eq!(method.exception_handlers.len(), 2);
        assert_eq!(method.exception_handlers[1].catch_type, None);
    }

    #[test]
    fn reports_bad_lines() {
        let err = parse("method static me/A.f ()V\n  goto nowhere\nend").err().unwrap();
        assert_eq!(err.line, 2);

        let err = parse("method static me/A.f ()V\n  frobnicate\nend").err().unwrap();
        assert!(err.message.contains("frobnicate"));

        let err = parse("method static me/A.f ()V\n  return\n").err().unwrap();
        assert_eq!(err.line, 1);

        let err = parse("method static me/A.f ()V\n  return\ndangling:\nend").err().unwrap();
        assert!(err.message.contains("dangling"));
    }
}

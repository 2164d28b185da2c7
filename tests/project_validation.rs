use plcopen_validator_lib::document::{Document, NodeId, ERROR_TAG, INFO_TAG};
use plcopen_validator_lib::parser::parse_file_from_str;
use plcopen_validator_lib::rules::config::{parse_config_from_text, EXAMPLE_CONFIG_JSON};
use plcopen_validator_lib::rules::diagnostics::{errors_of, infos_of};
use plcopen_validator_lib::rules::{validate_document, ValidatorConfig};

const CLEAN: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<project xmlns="http://www.plcopen.org/xml/tc6_0201">
  <fileHeader companyName="ACME" productName="Bottling" productVersion="1.0" creationDateTime="2024-05-01T08:00:00"/>
  <contentHeader name="Bottling line">
    <coordinateInfo><fbd><scaling x="1" y="1"/></fbd><ld><scaling x="1" y="1"/></ld><sfc><scaling x="1" y="1"/></sfc></coordinateInfo>
  </contentHeader>
  <types>
    <dataTypes>
      <dataType name="Pressure"><baseType><REAL/></baseType></dataType>
      <dataType name="Threshold"><baseType><derived name="Pressure"/></baseType></dataType>
    </dataTypes>
    <pous>
      <pou name="Scale" pouType="function">
        <interface>
          <returnType><derived name="Pressure"/></returnType>
          <inputVars>
            <variable name="Raw"><type><INT/></type></variable>
          </inputVars>
        </interface>
        <body><ST><xhtml:p xmlns:xhtml="http://www.w3.org/1999/xhtml">Scale := INT_TO_REAL(Raw) / 10.0;</xhtml:p></ST></body>
      </pou>
      <pou name="Valve" pouType="functionBlock">
        <interface>
          <inputVars>
            <variable name="EN"><type><BOOL/></type></variable>
            <variable name="Open"><type><BOOL/></type></variable>
          </inputVars>
          <outputVars>
            <variable name="ENO"><type><BOOL/></type></variable>
          </outputVars>
          <localVars>
            <variable name="Delay"><type><derived name="TON"/></type></variable>
          </localVars>
        </interface>
      </pou>
      <pou name="Main" pouType="program">
        <interface>
          <localVars>
            <variable name="Start" address="%IX1.0"><type><BOOL/></type></variable>
            <variable name="Level" address="%IW4"><type><INT/></type></variable>
            <variable name="Spare" address="%Q*"><type><WORD/></type></variable>
            <variable name="Inlet"><type><derived name="Valve"/></type></variable>
          </localVars>
        </interface>
      </pou>
    </pous>
  </types>
</project>"#;

fn count(doc: &Document, tag: &str) -> usize {
    doc.descendants(doc.root())
        .into_iter()
        .filter(|&n| doc.tag(n) == tag)
        .count()
}

fn load(xml: &str) -> Document {
    parse_file_from_str(xml).unwrap()
}

fn find(doc: &Document, tag: &str, name: &str) -> NodeId {
    doc.descendants(doc.root())
        .into_iter()
        .find(|&n| doc.tag(n) == tag && doc.attr_trimmed(n, "name") == name)
        .unwrap_or_else(|| panic!("no <{tag} name=\"{name}\">"))
}

fn wrap(data_types: &str, pous: &str) -> String {
    format!(
        r#"<project><contentHeader name="Test"/><types><dataTypes>{}</dataTypes><pous>{}</pous></types></project>"#,
        data_types, pous
    )
}

#[test]
fn clean_project_has_no_diagnostics() {
    let mut doc = load(CLEAN);
    let report = validate_document(&mut doc, &ValidatorConfig::default());
    assert!(report.is_ok(), "{:?}", report.diagnostics);
    assert_eq!(report.info_count, 0);
    assert_eq!(count(&doc, ERROR_TAG), 0);
}

#[test]
fn validation_is_idempotent_on_clean_documents() {
    let mut doc = load(CLEAN);
    let config = ValidatorConfig::default();
    validate_document(&mut doc, &config);
    let second = validate_document(&mut doc, &config);
    assert!(second.diagnostics.is_empty());
}

#[test]
fn second_run_sees_the_same_structure() {
    let xml = wrap(
        r#"<dataType name="IF"><baseType><INT/></baseType></dataType>"#,
        r#"<pou name="Main" pouType="program"><interface><localVars>
             <variable name="Speed"><type><INT/></type>
               <initialValue><simpleValue value="40000"/></initialValue></variable>
           </localVars></interface></pou>"#,
    );
    let mut doc = load(&xml);
    let config = ValidatorConfig::default();
    let first = validate_document(&mut doc, &config);
    assert_eq!(first.error_count, 2);
    let second = validate_document(&mut doc, &config);
    assert_eq!(second.error_count, 4);
}

#[test]
fn naming_reports_only_the_first_rule() {
    let xml = wrap(
        r#"<dataType name=""><baseType><INT/></baseType></dataType>
           <dataType name="2fast"><baseType><INT/></baseType></dataType>
           <dataType name="while"><baseType><INT/></baseType></dataType>
           <dataType name="Tof"><baseType><INT/></baseType></dataType>
           <dataType name="Main"><baseType><INT/></baseType></dataType>
           <dataType name="Dup"><baseType><INT/></baseType></dataType>
           <dataType name="dup"><baseType><INT/></baseType></dataType>"#,
        r#"<pou name="Main" pouType="program"/>"#,
    );
    let mut doc = load(&xml);
    validate_document(&mut doc, &ValidatorConfig::default());
    let holder = doc.path(doc.root(), &["types", "dataTypes"]).unwrap();
    let messages: Vec<Vec<String>> = doc.elements(holder).into_iter().map(|dt| errors_of(&doc, dt)).collect();
    assert_eq!(
        messages,
        vec![
            vec!["The data type name cannot be empty."],
            vec!["The data type name must be a valid identifier."],
            vec!["The data type name cannot be a reserved word."],
            vec!["A data type cannot have the same name as a standard POU."],
            vec!["A data type cannot have the same name as a user defined POU."],
            vec!["The data type name is not unique."],
            vec!["The data type name is not unique."],
        ]
    );
}

#[test]
fn self_derived_type_reports_once() {
    let xml = wrap(
        r#"<dataType name="Loop"><baseType><derived name="LOOP"/></baseType></dataType>
           <dataType name="Speed"><baseType><INT/></baseType></dataType>
           <dataType name="Rpm"><baseType><derived name="speed"/></baseType></dataType>"#,
        "",
    );
    let mut doc = load(&xml);
    validate_document(&mut doc, &ValidatorConfig::default());
    let base_of = |name: &str| {
        let base = doc.find_child(find(&doc, "dataType", name), "baseType").unwrap();
        doc.single_child(base).unwrap()
    };
    assert_eq!(
        errors_of(&doc, base_of("Loop")),
        vec!["A user defined type cannot have the same name as its base type."]
    );
    assert!(errors_of(&doc, base_of("Rpm")).is_empty());
}

#[test]
fn bit_addresses_follow_the_variable_type() {
    let xml = wrap(
        "",
        r#"<pou name="Main" pouType="program"><interface><localVars>
             <variable name="Start" address="%IX1.0"><type><BOOL/></type></variable>
             <variable name="Count" address="%IX1.0"><type><INT/></type></variable>
           </localVars></interface></pou>"#,
    );
    let mut doc = load(&xml);
    validate_document(&mut doc, &ValidatorConfig::default());
    assert!(errors_of(&doc, find(&doc, "variable", "Start")).is_empty());
    let errors = errors_of(&doc, find(&doc, "variable", "Count"));
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("bit syntax"));
}

#[test]
fn struct_members_need_a_member_attribute() {
    let xml = wrap(
        "",
        r#"<pou name="Main" pouType="program"><interface><localVars>
             <variable name="Drive"><type><derived name="MC_Power"/></type>
               <initialValue><structValue>
                 <value member="Enable"><simpleValue value="TRUE"/></value>
                 <value member="Whatever"><simpleValue value="1"/></value>
                 <value><simpleValue value="1"/></value>
               </structValue></initialValue></variable>
           </localVars></interface></pou>"#,
    );
    let mut doc = load(&xml);
    let config = parse_config_from_text(EXAMPLE_CONFIG_JSON).unwrap();
    validate_document(&mut doc, &config);

    let sv = doc
        .path(find(&doc, "variable", "Drive"), &["initialValue", "structValue"])
        .unwrap();
    let values = doc.elements(sv);
    let simple = |v: NodeId| doc.single_child(v).unwrap();
    assert_eq!(infos_of(&doc, simple(values[0])), vec!["TRUE"]);
    assert!(errors_of(&doc, values[1]).is_empty());
    assert_eq!(errors_of(&doc, values[2]), vec!["The member attribute is required."]);
}

#[test]
fn en_outside_input_vars_is_reported_regardless_of_type() {
    for ty in ["<BOOL/>", "<INT/>"] {
        let xml = wrap(
            "",
            &format!(
                r#"<pou name="Block" pouType="functionBlock"><interface><outputVars>
                     <variable name="EN"><type>{}</type></variable>
                   </outputVars></interface></pou>"#,
                ty
            ),
        );
        let mut doc = load(&xml);
        validate_document(&mut doc, &ValidatorConfig::default());
        let errors = errors_of(&doc, find(&doc, "variable", "EN"));
        assert!(errors.iter().any(|e| e.contains("parent node can only be an inputVar element")));
    }
}

#[test]
fn parse_failures_short_circuit_type_checks() {
    let xml = wrap(
        r#"<dataType name="Small"><baseType><SINT/></baseType>
             <initialValue><simpleValue value="1000 +"/></initialValue></dataType>"#,
        "",
    );
    let mut doc = load(&xml);
    validate_document(&mut doc, &ValidatorConfig::default());
    let sv = doc
        .path(find(&doc, "dataType", "Small"), &["initialValue", "simpleValue"])
        .unwrap();
    let errors = errors_of(&doc, sv);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("not a valid literal expression"));
    assert!(infos_of(&doc, sv).is_empty());
}

#[test]
fn canonical_values_are_reported_as_info() {
    let xml = wrap(
        r#"<dataType name="Cycle"><baseType><TIME/></baseType>
             <initialValue><simpleValue value="T#1m_30s"/></initialValue></dataType>"#,
        r#"<pou name="Main" pouType="program"><interface><localVars>
             <variable name="Mask"><type><BYTE/></type>
               <initialValue><simpleValue value="16#0F"/></initialValue></variable>
             <variable name="Ceiling"><type><INT/></type>
               <initialValue><simpleValue value="MaxLimit - 1"/></initialValue></variable>
           </localVars></interface></pou>"#,
    );
    let mut doc = load(&xml);
    let report = validate_document(&mut doc, &ValidatorConfig::default());
    assert!(report.is_ok(), "{:?}", report.diagnostics);
    assert_eq!(report.info_count, 3);
    assert_eq!(count(&doc, INFO_TAG), 3);

    let iv = |name: &str| doc.find_child(find(&doc, "variable", name), "initialValue").unwrap();
    assert_eq!(infos_of(&doc, iv("Mask")), vec!["15"]);
    assert_eq!(infos_of(&doc, iv("Ceiling")), vec![""]);
    let cycle = doc
        .path(find(&doc, "dataType", "Cycle"), &["initialValue", "simpleValue"])
        .unwrap();
    assert_eq!(infos_of(&doc, cycle), vec!["T#90000ms"]);
}

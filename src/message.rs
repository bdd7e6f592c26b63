use crate::domain_name::DomainName;
use crate::error::{map_encode_err, DNSCheckError, Result};
use crate::{
    query::{DNSHeader, DNSQuestion},
    resource_record::DNSRecord,
    rr_types::RRType,
};

// DNSMessage represents a DNS message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DNSMessage {
    header: DNSHeader,
    questions: Vec<DNSQuestion>,
    answers: Vec<DNSRecord>,
    authorities: Vec<DNSRecord>,
    additionals: Vec<DNSRecord>,
}

impl DNSMessage {
    // Turns the message into a recursive query for a single question. The
    // question section is replaced rather than appended to, and every other
    // section is cleared, so a message can be reused between queries without
    // carrying anything over from the previous one.
    pub fn set_question(&mut self, name: DomainName, q_type: RRType, id: u16) {
        self.header = DNSHeader::query(id, 1);
        self.questions = vec![DNSQuestion::new(name, q_type)];
        self.answers.clear();
        self.authorities.clear();
        self.additionals.clear();
    }

    // Builds a response to this message carrying the provided answers.
    pub fn reply(&self, answers: Vec<DNSRecord>) -> DNSMessage {
        let mut header = self.header.clone();
        header.set_response();
        DNSMessage {
            header,
            questions: self.questions.clone(),
            answers,
            authorities: vec![],
            additionals: vec![],
        }
    }

    // Decode the message from its wire format into our representation.
    pub fn decode(message: &[u8]) -> Result<DNSMessage> {
        let mut message_iter = message.iter();
        let mut questions = vec![];
        let mut answers = vec![];
        let mut authorities = vec![];
        let mut additionals = vec![];

        let header = DNSHeader::decode(&mut message_iter)?;
        for _ in 0..header.num_questions() {
            let question = DNSQuestion::decode(&mut message_iter, message)?;
            questions.push(question);
        }
        for _ in 0..header.num_answers() {
            let answer = DNSRecord::decode(&mut message_iter, message)?;
            answers.push(answer);
        }
        for _ in 0..header.num_authorities() {
            let rr = DNSRecord::decode(&mut message_iter, message)?;
            authorities.push(rr);
        }
        for _ in 0..header.num_additionals() {
            let rr = DNSRecord::decode(&mut message_iter, message)?;
            additionals.push(rr);
        }

        Ok(DNSMessage {
            header,
            questions,
            answers,
            authorities,
            additionals,
        })
    }

    // Encode the message into the wire format.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut header = self.header.clone();
        header.set_counts(
            section_len("questions", self.questions.len())?,
            section_len("answers", self.answers.len())?,
            section_len("authorities", self.authorities.len())?,
            section_len("additionals", self.additionals.len())?,
        );

        let mut encoded = vec![];
        header.encode(&mut encoded);
        for question in &self.questions {
            question.encode(&mut encoded)?;
        }
        for answer in &self.answers {
            answer.encode(&mut encoded)?;
        }
        for authority in &self.authorities {
            authority.encode(&mut encoded)?;
        }
        for additional in &self.additionals {
            additional.encode(&mut encoded)?;
        }
        Ok(encoded)
    }

    pub fn header(&self) -> &DNSHeader {
        &self.header
    }

    pub fn id(&self) -> u16 {
        self.header.id()
    }

    pub fn set_id(&mut self, id: u16) {
        self.header.set_id(id);
    }

    pub fn questions(&self) -> &[DNSQuestion] {
        &self.questions
    }

    // Returns the entire answers section.
    pub fn answers(&self) -> &[DNSRecord] {
        &self.answers
    }
}

fn section_len(section: &str, len: usize) -> Result<u16> {
    u16::try_from(len).map_err(|e| map_encode_err(section, &e))
}

// Verifies that `response` answers `query`.
pub fn check_response_id(query: &DNSMessage, response: &DNSMessage) -> Result<()> {
    if response.id() != query.id() {
        return Err(DNSCheckError::IdMismatch(response.id(), query.id()));
    }
    Ok(())
}
